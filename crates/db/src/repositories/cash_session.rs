//! Cash session repository.
//!
//! Runs the cash session state machine from `navette_core::cash` against
//! locked `cash_sessions` rows.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait, Unchanged,
};
use uuid::Uuid;

use navette_core::auth::UserRole;
use navette_core::cash::{
    CashDeskState, CashSessionError, CashSessionService, CashSessionState, SessionBookingRow,
    SessionClosure, ShiftSummary,
};
use navette_shared::types::{CashDeskId, CashSessionId, UserId};

use super::trip::RowLock;
use crate::entities::{
    bookings, cash_desks, cash_sessions, sea_orm_active_enums::CashSessionStatus, tickets,
};

/// Error types for cash session operations.
#[derive(Debug, thiserror::Error)]
pub enum CashSessionRepositoryError {
    /// State machine rejected the operation.
    #[error(transparent)]
    Session(#[from] CashSessionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CashSessionRepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Session(e) => e.error_code(),
            Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Session(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

pub(crate) fn to_state(model: &cash_sessions::Model) -> CashSessionState {
    CashSessionState {
        id: CashSessionId::from_uuid(model.id),
        desk_id: CashDeskId::from_uuid(model.cash_desk_id),
        cashier_id: UserId::from_uuid(model.user_id),
        status: model.status.into(),
        opening_amount: model.opening_amount,
        expected_amount: model.expected_amount,
        closing_amount_declared: model.closing_amount_declared,
        discrepancy_amount: model.discrepancy_amount,
        opened_at: model.opened_at.with_timezone(&Utc),
        closed_at: model.closed_at.map(|t| t.with_timezone(&Utc)),
        closed_by: model.closed_by.map(UserId::from_uuid),
        notes: model.notes.clone(),
    }
}

/// Reads one session, optionally locked.
pub(crate) async fn load_session<C: ConnectionTrait>(
    conn: &C,
    id: CashSessionId,
    lock: RowLock,
) -> Result<Option<CashSessionState>, DbErr> {
    let mut query = cash_sessions::Entity::find_by_id(id.into_inner());
    if lock == RowLock::ForUpdate {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.as_ref().map(to_state))
}

/// Reads the cashier's open session, optionally locked.
async fn load_open_for<C: ConnectionTrait>(
    conn: &C,
    cashier_id: UserId,
    lock: RowLock,
) -> Result<Option<CashSessionState>, DbErr> {
    let mut query = cash_sessions::Entity::find()
        .filter(cash_sessions::Column::UserId.eq(cashier_id.into_inner()))
        .filter(cash_sessions::Column::Status.eq(CashSessionStatus::Open));
    if lock == RowLock::ForUpdate {
        query = query.lock_exclusive();
    }
    Ok(query.one(conn).await?.as_ref().map(to_state))
}

/// Writes the running expected amount of a locked open session.
pub(crate) async fn save_expected<C: ConnectionTrait>(
    conn: &C,
    session: &CashSessionState,
) -> Result<(), DbErr> {
    cash_sessions::ActiveModel {
        id: Unchanged(session.id.into_inner()),
        expected_amount: Set(session.expected_amount),
        ..Default::default()
    }
    .update(conn)
    .await?;
    Ok(())
}

async fn save_closure<C: ConnectionTrait>(
    conn: &C,
    id: CashSessionId,
    closure: &SessionClosure,
) -> Result<cash_sessions::Model, DbErr> {
    cash_sessions::ActiveModel {
        id: Unchanged(id.into_inner()),
        status: Set(closure.status.into()),
        closing_amount_declared: Set(Some(closure.closing_amount_declared)),
        discrepancy_amount: Set(Some(closure.discrepancy_amount)),
        closed_at: Set(Some(closure.closed_at.into())),
        closed_by: Set(Some(closure.closed_by.into_inner())),
        notes: Set(closure.notes.clone()),
        ..Default::default()
    }
    .update(conn)
    .await
}

/// Cash session repository.
#[derive(Debug, Clone)]
pub struct CashSessionRepository {
    db: DatabaseConnection,
}

impl CashSessionRepository {
    /// Creates a new cash session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a shift for `cashier_id` at `desk_id`.
    ///
    /// # Errors
    ///
    /// - `DeskNotFound` / `DeskInactive` for an unusable desk
    /// - `AlreadyOpen` if the cashier has an open session
    /// - `InvalidAmount` for a negative opening amount
    pub async fn open(
        &self,
        desk_id: CashDeskId,
        cashier_id: UserId,
        opening_amount: Decimal,
    ) -> Result<cash_sessions::Model, CashSessionRepositoryError> {
        let txn = self.db.begin().await?;

        let desk = cash_desks::Entity::find_by_id(desk_id.into_inner())
            .one(&txn)
            .await?
            .ok_or(CashSessionError::DeskNotFound(desk_id))?;
        let desk = CashDeskState {
            id: desk_id,
            name: desk.name,
            is_active: desk.is_active,
        };

        let current = load_open_for(&txn, cashier_id, RowLock::ForUpdate).await?;
        let state = CashSessionService::open(
            &desk,
            cashier_id,
            current.as_ref(),
            opening_amount,
            Utc::now(),
        )?;

        let session = cash_sessions::ActiveModel {
            id: Set(state.id.into_inner()),
            cash_desk_id: Set(desk_id.into_inner()),
            user_id: Set(cashier_id.into_inner()),
            opening_amount: Set(state.opening_amount),
            expected_amount: Set(state.expected_amount),
            closing_amount_declared: Set(None),
            discrepancy_amount: Set(None),
            status: Set(CashSessionStatus::Open),
            opened_at: Set(state.opened_at.into()),
            closed_at: Set(None),
            closed_by: Set(None),
            notes: Set(None),
        };

        let inserted = match session.insert(&txn).await {
            Ok(model) => model,
            // A concurrent open won the partial unique index.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                drop(txn);
                let winner = load_open_for(&self.db, cashier_id, RowLock::None).await?;
                return Err(match winner {
                    Some(open) => CashSessionError::AlreadyOpen(open.id).into(),
                    None => err.into(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        txn.commit().await?;

        tracing::info!(
            session_id = %inserted.id,
            desk_id = %desk_id,
            cashier_id = %cashier_id,
            opening_amount = %opening_amount,
            "Cash session opened"
        );

        Ok(inserted)
    }

    /// Closes the cashier's open session with a counted amount.
    ///
    /// # Errors
    ///
    /// - `NoOpenSession` if the cashier has no open session
    /// - `InvalidAmount` for a negative declared amount
    pub async fn close(
        &self,
        cashier_id: UserId,
        declared_amount: Decimal,
        notes: Option<String>,
    ) -> Result<cash_sessions::Model, CashSessionRepositoryError> {
        let txn = self.db.begin().await?;

        let session = load_open_for(&txn, cashier_id, RowLock::ForUpdate)
            .await?
            .ok_or(CashSessionError::NoOpenSession)?;
        let closure =
            CashSessionService::close(&session, cashier_id, declared_amount, notes, Utc::now())?;
        let closed = save_closure(&txn, session.id, &closure).await?;

        txn.commit().await?;

        tracing::info!(
            session_id = %session.id,
            expected_amount = %session.expected_amount,
            declared_amount = %closure.closing_amount_declared,
            discrepancy = %closure.discrepancy_amount,
            "Cash session closed"
        );

        Ok(closed)
    }

    /// Closes any open session on a supervisor's or admin's authority.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` for an unknown session
    /// - `NotAllowed` if `role` cannot force-close
    /// - `AlreadyClosed` if the session is closed
    pub async fn force_close(
        &self,
        session_id: CashSessionId,
        actor: UserId,
        role: UserRole,
    ) -> Result<cash_sessions::Model, CashSessionRepositoryError> {
        let txn = self.db.begin().await?;

        let session = load_session(&txn, session_id, RowLock::ForUpdate)
            .await?
            .ok_or(CashSessionError::SessionNotFound(session_id))?;
        let closure = CashSessionService::force_close(&session, actor, role, Utc::now())?;
        let closed = save_closure(&txn, session_id, &closure).await?;

        txn.commit().await?;

        tracing::warn!(
            session_id = %session_id,
            actor = %actor,
            role = %role,
            expected_amount = %session.expected_amount,
            "Cash session force-closed"
        );

        Ok(closed)
    }

    /// Gets the cashier's open session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current(
        &self,
        cashier_id: UserId,
    ) -> Result<Option<CashSessionState>, CashSessionRepositoryError> {
        Ok(load_open_for(&self.db, cashier_id, RowLock::None).await?)
    }

    /// Gets a session by ID.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown session.
    pub async fn get(
        &self,
        session_id: CashSessionId,
    ) -> Result<CashSessionState, CashSessionRepositoryError> {
        load_session(&self.db, session_id, RowLock::None)
            .await?
            .ok_or_else(|| CashSessionError::SessionNotFound(session_id).into())
    }

    /// Aggregates the bookings recorded in a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown session.
    pub async fn summary(
        &self,
        session_id: CashSessionId,
    ) -> Result<ShiftSummary, CashSessionRepositoryError> {
        let session = self.get(session_id).await?;

        let session_bookings = bookings::Entity::find()
            .filter(bookings::Column::CashSessionId.eq(session_id.into_inner()))
            .all(&self.db)
            .await?;
        let booking_ids: Vec<Uuid> = session_bookings.iter().map(|b| b.id).collect();

        let session_tickets = if booking_ids.is_empty() {
            Vec::new()
        } else {
            tickets::Entity::find()
                .filter(tickets::Column::BookingId.is_in(booking_ids))
                .all(&self.db)
                .await?
        };

        let mut per_booking: HashMap<Uuid, (u32, u32)> = HashMap::new();
        for ticket in &session_tickets {
            let entry = per_booking.entry(ticket.booking_id).or_default();
            entry.0 += 1;
            if ticket.subscription_id.is_some() {
                entry.1 += 1;
            }
        }

        let rows: Vec<SessionBookingRow> = session_bookings
            .iter()
            .map(|b| {
                let (ticket_count, wallet_covered_tickets) =
                    per_booking.get(&b.id).copied().unwrap_or_default();
                SessionBookingRow {
                    status: b.status.into(),
                    payment_method: b.payment_method.into(),
                    total_amount: b.total_amount,
                    ticket_count,
                    wallet_covered_tickets,
                }
            })
            .collect();

        Ok(ShiftSummary::compute(&session, &rows))
    }
}
