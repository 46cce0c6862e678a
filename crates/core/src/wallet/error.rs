//! Wallet error types.

use thiserror::Error;

use navette_shared::types::SubscriptionId;

use super::types::SubscriptionStatus;

/// Errors raised by wallet checks and deductions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The deduction would take the wallet below zero.
    #[error("Subscription {0} cannot cover this charge")]
    Insufficient(SubscriptionId),

    /// The wallet is blocked or marked expired.
    #[error("Subscription {id} is {status}")]
    Inactive {
        /// Subscription ID.
        id: SubscriptionId,
        /// Current status.
        status: SubscriptionStatus,
    },

    /// The wallet's validity window has ended.
    #[error("Subscription {0} has expired")]
    Expired(SubscriptionId),

    /// The wallet belongs to someone other than the booking's owner.
    #[error("Subscription {0} does not belong to the purchaser")]
    NotOwner(SubscriptionId),
}

impl WalletError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Insufficient(_) => "INSUFFICIENT_WALLET_BALANCE",
            Self::Inactive { .. } | Self::Expired(_) => "SUBSCRIPTION_INACTIVE",
            Self::NotOwner(_) => "UNAUTHORIZED_WALLET",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Insufficient(_) | Self::Inactive { .. } | Self::Expired(_) => 400,
            Self::NotOwner(_) => 403,
        }
    }
}
