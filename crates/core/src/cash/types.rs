//! Cash session types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use navette_shared::types::{CashDeskId, CashSessionId, UserId};

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashSessionStatus {
    /// Shift in progress.
    Open,
    /// Closed by the cashier with a declared count.
    Closed,
    /// Closed by a supervisor or admin.
    ClosedAdmin,
}

impl CashSessionStatus {
    /// Returns true for both closed states.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed | Self::ClosedAdmin)
    }
}

string_enum!(CashSessionStatus, "cash session status" {
    Open => "open",
    Closed => "closed",
    ClosedAdmin => "closed_admin",
});

/// A cash desk as needed to open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashDeskState {
    /// Desk ID.
    pub id: CashDeskId,
    /// Display name.
    pub name: String,
    /// Inactive desks cannot open sessions.
    pub is_active: bool,
}

/// A cash session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashSessionState {
    /// Session ID.
    pub id: CashSessionId,
    /// Desk the shift runs at.
    pub desk_id: CashDeskId,
    /// Cashier running the shift.
    pub cashier_id: UserId,
    /// Lifecycle status.
    pub status: CashSessionStatus,
    /// Float counted at opening.
    pub opening_amount: Decimal,
    /// Opening float plus every sale's cash-paid total.
    pub expected_amount: Decimal,
    /// Amount counted at close.
    pub closing_amount_declared: Option<Decimal>,
    /// `declared - expected`, frozen at close.
    pub discrepancy_amount: Option<Decimal>,
    /// When the shift started.
    pub opened_at: DateTime<Utc>,
    /// When the shift ended.
    pub closed_at: Option<DateTime<Utc>>,
    /// Who closed it.
    pub closed_by: Option<UserId>,
    /// Free-text closing notes.
    pub notes: Option<String>,
}

/// Point-of-sale context threaded explicitly into a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeskContext {
    /// Open session the sale accrues to.
    pub session_id: CashSessionId,
    /// Desk the sale is made at.
    pub desk_id: CashDeskId,
    /// Cashier making the sale.
    pub cashier_id: UserId,
}

impl DeskContext {
    /// Builds the context for an open session.
    #[must_use]
    pub const fn for_session(session: &CashSessionState) -> Self {
        Self {
            session_id: session.id,
            desk_id: session.desk_id,
            cashier_id: session.cashier_id,
        }
    }
}
