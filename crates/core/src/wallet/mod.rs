//! Subscription wallets ("badges").
//!
//! A wallet is a subscription bound to one user. Depending on its plan it
//! carries a count of voyage credits, unlimited travel, or a legacy currency
//! balance. Coverage is all-or-nothing per passenger: a ticket is either paid
//! entirely from the wallet or at full price.

pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use error::WalletError;
pub use ledger::WalletDrawdown;
pub use types::{CreditType, SubscriptionStatus, TripLegs, Wallet, WalletBalance, WalletCharge};
