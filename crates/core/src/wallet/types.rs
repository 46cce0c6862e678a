//! Wallet domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use navette_shared::types::{SubscriptionId, UserId};

/// How a plan measures what its subscribers may travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    /// Unlimited travel for the validity window.
    Unlimited,
    /// A fixed number of voyage credits, one per leg.
    Counted,
    /// A prepaid currency balance.
    Legacy,
}

string_enum!(CreditType, "credit type" {
    Unlimited => "unlimited",
    Counted => "counted",
    Legacy => "legacy",
});

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Usable.
    Active,
    /// Suspended by an operator.
    Blocked,
    /// Past its validity window.
    Expired,
}

string_enum!(SubscriptionStatus, "subscription status" {
    Active => "active",
    Blocked => "blocked",
    Expired => "expired",
});

/// Remaining value of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletBalance {
    /// Nothing to count.
    Unlimited,
    /// Voyage credits left.
    Counted {
        /// Credits left.
        remaining: u32,
    },
    /// Currency left.
    Legacy {
        /// Balance left.
        balance: Decimal,
    },
}

impl WalletBalance {
    /// Returns the credit type this balance belongs to.
    #[must_use]
    pub const fn credit_type(&self) -> CreditType {
        match self {
            Self::Unlimited => CreditType::Unlimited,
            Self::Counted { .. } => CreditType::Counted,
            Self::Legacy { .. } => CreditType::Legacy,
        }
    }
}

/// Number of legs a ticket travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripLegs {
    /// Outbound only.
    OneWay,
    /// Outbound and return on one ticket.
    RoundTrip,
}

impl TripLegs {
    /// Returns the number of voyage credits the ticket consumes.
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Self::OneWay => 1,
            Self::RoundTrip => 2,
        }
    }
}

/// What a covered ticket consumed from its wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WalletCharge {
    /// Covered by an unlimited plan.
    Unlimited,
    /// Voyage credits consumed.
    Credits(u32),
    /// Legacy balance consumed.
    Amount(Decimal),
}

impl WalletCharge {
    /// Returns the credits consumed, zero for non-counted charges.
    #[must_use]
    pub const fn credits(&self) -> u32 {
        match self {
            Self::Credits(n) => *n,
            _ => 0,
        }
    }

    /// Returns the legacy balance consumed, zero for non-legacy charges.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        match self {
            Self::Amount(a) => *a,
            _ => Decimal::ZERO,
        }
    }
}

/// A subscription as seen by a sale, read under a row lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    /// Subscription ID.
    pub id: SubscriptionId,
    /// Owning user.
    pub owner_id: UserId,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// End of the validity window.
    pub ends_at: DateTime<Utc>,
    /// Whether passengers other than the holder may draw from the wallet.
    pub allow_multi_passenger: bool,
    /// Remaining value.
    pub balance: WalletBalance,
}
