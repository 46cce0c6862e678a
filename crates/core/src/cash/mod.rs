//! Cash desk sessions.
//!
//! A session is one cashier's shift at one desk. It moves `open → closed` or
//! `open → closed_admin` and is never reopened. While open, its
//! `expected_amount` only grows: every point-of-sale sale adds the amount
//! taken in cash, card or mobile money. Closing freezes the declared count
//! and the discrepancy against the expected amount.

pub mod error;
pub mod service;
pub mod summary;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CashSessionError;
pub use service::{CashSessionService, SessionClosure};
pub use summary::{SessionBookingRow, ShiftSummary};
pub use types::{CashDeskState, CashSessionState, CashSessionStatus, DeskContext};
