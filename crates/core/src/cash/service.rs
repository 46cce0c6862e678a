//! Cash session state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use navette_shared::types::{CashSessionId, UserId};

use crate::auth::UserRole;
use crate::cash::error::CashSessionError;
use crate::cash::types::{CashDeskState, CashSessionState, CashSessionStatus, DeskContext};

/// Outcome of a close or force-close, to be written back to the session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionClosure {
    /// `closed` or `closed_admin`.
    pub status: CashSessionStatus,
    /// Amount declared (the expected amount on a force-close).
    pub closing_amount_declared: Decimal,
    /// `declared - expected`.
    pub discrepancy_amount: Decimal,
    /// Close time.
    pub closed_at: DateTime<Utc>,
    /// Who closed.
    pub closed_by: UserId,
    /// Optional notes.
    pub notes: Option<String>,
}

impl SessionClosure {
    /// Writes the closure onto the session.
    pub fn apply(self, session: &mut CashSessionState) {
        session.status = self.status;
        session.closing_amount_declared = Some(self.closing_amount_declared);
        session.discrepancy_amount = Some(self.discrepancy_amount);
        session.closed_at = Some(self.closed_at);
        session.closed_by = Some(self.closed_by);
        session.notes = self.notes;
    }
}

/// Stateless service for cash session transitions.
pub struct CashSessionService;

impl CashSessionService {
    /// Opens a shift for `cashier_id` at `desk`.
    ///
    /// `current` is the cashier's open session, if any, read under lock.
    ///
    /// # Errors
    ///
    /// - `DeskInactive` if the desk is deactivated
    /// - `InvalidAmount` for a negative opening float
    /// - `AlreadyOpen` if the cashier already has an open session
    pub fn open(
        desk: &CashDeskState,
        cashier_id: UserId,
        current: Option<&CashSessionState>,
        opening_amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<CashSessionState, CashSessionError> {
        if !desk.is_active {
            return Err(CashSessionError::DeskInactive(desk.id));
        }
        if opening_amount < Decimal::ZERO {
            return Err(CashSessionError::InvalidAmount(format!(
                "opening amount {opening_amount} is negative"
            )));
        }
        if let Some(open) = current.filter(|s| s.status == CashSessionStatus::Open) {
            return Err(CashSessionError::AlreadyOpen(open.id));
        }

        Ok(CashSessionState {
            id: CashSessionId::new(),
            desk_id: desk.id,
            cashier_id,
            status: CashSessionStatus::Open,
            opening_amount,
            expected_amount: opening_amount,
            closing_amount_declared: None,
            discrepancy_amount: None,
            opened_at: now,
            closed_at: None,
            closed_by: None,
            notes: None,
        })
    }

    /// Checks that a sale's desk context matches an open session.
    ///
    /// # Errors
    ///
    /// - `AlreadyClosed` if the session is no longer open
    /// - `Mismatch` if the session belongs to another cashier or desk
    pub fn verify_context(
        session: &CashSessionState,
        ctx: &DeskContext,
    ) -> Result<(), CashSessionError> {
        if session.id != ctx.session_id
            || session.cashier_id != ctx.cashier_id
            || session.desk_id != ctx.desk_id
        {
            return Err(CashSessionError::Mismatch(ctx.session_id));
        }
        if session.status.is_closed() {
            return Err(CashSessionError::AlreadyClosed(session.id));
        }
        Ok(())
    }

    /// Adds a sale's cash-paid total to the expected amount.
    ///
    /// # Errors
    ///
    /// Returns a context error from [`Self::verify_context`] or
    /// `InvalidAmount` for a negative total.
    pub fn accrue(
        session: &mut CashSessionState,
        ctx: &DeskContext,
        cash_paid_total: Decimal,
    ) -> Result<(), CashSessionError> {
        Self::verify_context(session, ctx)?;
        if cash_paid_total < Decimal::ZERO {
            return Err(CashSessionError::InvalidAmount(format!(
                "sale total {cash_paid_total} is negative"
            )));
        }
        session.expected_amount += cash_paid_total;
        Ok(())
    }

    /// Closes the cashier's own session with a counted amount.
    ///
    /// # Errors
    ///
    /// - `AlreadyClosed` if the session is closed
    /// - `Mismatch` if `actor` is not the session's cashier
    /// - `InvalidAmount` for a negative declared amount
    pub fn close(
        session: &CashSessionState,
        actor: UserId,
        declared_amount: Decimal,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionClosure, CashSessionError> {
        if session.status.is_closed() {
            return Err(CashSessionError::AlreadyClosed(session.id));
        }
        if session.cashier_id != actor {
            return Err(CashSessionError::Mismatch(session.id));
        }
        if declared_amount < Decimal::ZERO {
            return Err(CashSessionError::InvalidAmount(format!(
                "declared amount {declared_amount} is negative"
            )));
        }

        Ok(SessionClosure {
            status: CashSessionStatus::Closed,
            closing_amount_declared: declared_amount,
            discrepancy_amount: declared_amount - session.expected_amount,
            closed_at: now,
            closed_by: actor,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Closes a session on a supervisor's or admin's authority.
    ///
    /// The expected amount stands in for the count, so the discrepancy is zero.
    ///
    /// # Errors
    ///
    /// - `NotAllowed` if the role cannot force-close
    /// - `AlreadyClosed` if the session is closed
    pub fn force_close(
        session: &CashSessionState,
        actor: UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<SessionClosure, CashSessionError> {
        if !role.can_force_close_session() {
            return Err(CashSessionError::NotAllowed("force-close a cash session"));
        }
        if session.status.is_closed() {
            return Err(CashSessionError::AlreadyClosed(session.id));
        }

        Ok(SessionClosure {
            status: CashSessionStatus::ClosedAdmin,
            closing_amount_declared: session.expected_amount,
            discrepancy_amount: Decimal::ZERO,
            closed_at: now,
            closed_by: actor,
            notes: Some(format!("Force-closed by {role}")),
        })
    }
}
