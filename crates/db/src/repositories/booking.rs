//! Booking repository.
//!
//! Executes sales and cancellations planned by `navette_core::reservation`,
//! each inside a single database transaction. Rows are locked in one global
//! order: trips ascending by id, then the subscription, then the cash
//! session, then the booking.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};
use serde::Serialize;
use uuid::Uuid;

use navette_core::auth::UserRole;
use navette_core::cash::{CashSessionError, CashSessionService};
use navette_core::reservation::{
    BookingConfirmation, BookingError, BookingSnapshot, CancellationActor, ConfirmationTicket,
    DEFAULT_MAX_PASSENGERS, LedgerLine, PassengerInput, ReservationPlanner, SaleRequest,
    Settlement, TicketSnapshot, TripSnapshot, generate_reference, lock_order, plan_cancellation,
    restore_seats, sale_lines, take_seats, trips_held,
};
use navette_shared::types::{BookingId, SubscriptionId, TicketId, TransactionId, TripId, UserId};

use super::cash_session::{load_session, save_expected};
use super::subscription::{SubscriptionError, load_wallet, save_balance};
use super::trip::{RowLock, TripError, load_trip, route_label, set_available_seats};
use super::user::{UserError, insert_guest};
use crate::entities::{bookings, sea_orm_active_enums as db_enums, tickets, transactions, users};

/// Error types for booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingRepositoryError {
    /// A reservation rule rejected the operation.
    #[error(transparent)]
    Rule(#[from] BookingError),

    /// Stored data or a side computation is unusable.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl BookingRepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Rule(e) => e.error_code(),
            Self::Internal(_) | Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Rule(e) => e.http_status_code(),
            Self::Internal(_) | Self::Database(_) => 500,
        }
    }

    const fn is_unexpected(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Database(_))
    }
}

impl From<TripError> for BookingRepositoryError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::NotFound(id) => BookingError::TripNotFound(id).into(),
            TripError::Pricing(e) => BookingError::Pricing(e).into(),
            TripError::Corrupt(id, msg) => Self::Internal(format!("trip {id}: {msg}")),
            TripError::Database(e) => Self::Database(e),
        }
    }
}

impl From<SubscriptionError> for BookingRepositoryError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::NotFound(id) => BookingError::SubscriptionNotFound(id).into(),
            SubscriptionError::Corrupt(id, msg) => Self::Internal(format!("wallet {id}: {msg}")),
            SubscriptionError::Database(e) => Self::Database(e),
        }
    }
}

impl From<UserError> for BookingRepositoryError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Invalid(e) => BookingError::Validation(e.to_string()).into(),
            UserError::EmailTaken(email) => {
                BookingError::Validation(format!("email {email} is already registered")).into()
            }
            UserError::Password(e) => Self::Internal(e.to_string()),
            UserError::Database(e) => Self::Database(e),
        }
    }
}

impl From<CashSessionError> for BookingRepositoryError {
    fn from(err: CashSessionError) -> Self {
        BookingError::from(err).into()
    }
}

/// A booking with its tickets and ledger.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    /// Booking row.
    pub booking: bookings::Model,
    /// Ticket rows, one per passenger.
    pub tickets: Vec<tickets::Model>,
    /// Ledger rows, oldest first.
    pub transactions: Vec<transactions::Model>,
}

impl BookingDetails {
    /// Converts to the shape the cancellation planner reads.
    #[must_use]
    pub fn snapshot(&self) -> BookingSnapshot {
        let b = &self.booking;
        BookingSnapshot {
            id: BookingId::from_uuid(b.id),
            reference: b.booking_reference.clone(),
            status: b.status.into(),
            owner_id: b.user_id.map(UserId::from_uuid),
            created_by: b.created_by.map(UserId::from_uuid),
            payment_method: b.payment_method.into(),
            trip_id: TripId::from_uuid(b.trip_id),
            tickets: self
                .tickets
                .iter()
                .map(|t| TicketSnapshot {
                    id: TicketId::from_uuid(t.id),
                    trip_id: TripId::from_uuid(t.trip_id),
                    return_trip_id: t.return_trip_id.map(TripId::from_uuid),
                    status: t.status.into(),
                    price_paid: t.price_paid,
                })
                .collect(),
        }
    }

    /// Whether `user_id` may read this booking.
    #[must_use]
    pub fn is_visible_to(&self, user_id: UserId, role: UserRole) -> bool {
        let user = Some(user_id.into_inner());
        role.is_privileged() || self.booking.user_id == user || self.booking.created_by == user
    }
}

/// A committed sale and the confirmation to send for it.
#[derive(Debug, Clone)]
pub struct CreatedBooking {
    /// Persisted booking.
    pub details: BookingDetails,
    /// Confirmation, when the owner has an email address.
    pub confirmation: Option<BookingConfirmation>,
}

/// Booking repository for sales, cancellations and reads.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    db: DatabaseConnection,
    planner: ReservationPlanner,
}

impl BookingRepository {
    /// Creates a new booking repository with the default passenger limit.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self::with_planner(db, ReservationPlanner::new(DEFAULT_MAX_PASSENGERS))
    }

    /// Creates a booking repository with a configured planner.
    #[must_use]
    pub const fn with_planner(db: DatabaseConnection, planner: ReservationPlanner) -> Self {
        Self { db, planner }
    }

    /// Sells seats for every passenger of `request`.
    ///
    /// Everything (guest account, booking, tickets, ledger, wallet, seat
    /// counts, cash session) is written in one transaction; any failure rolls
    /// all of it back.
    ///
    /// # Errors
    ///
    /// `Rule` for any reservation, pricing, wallet or session rule; `Database`
    /// or `Internal` for unexpected failures, which are also logged.
    pub async fn create_booking(
        &self,
        request: SaleRequest,
    ) -> Result<CreatedBooking, BookingRepositoryError> {
        self.planner.validate_request(&request)?;

        let txn = self.db.begin().await?;
        match self.sell(&txn, &request).await {
            Ok(created) => {
                txn.commit().await?;
                tracing::info!(
                    booking_id = %created.details.booking.id,
                    reference = %created.details.booking.booking_reference,
                    trip_id = %request.trip_id,
                    passengers = request.passengers.len(),
                    total = %created.details.booking.total_amount,
                    "Booking created"
                );
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed sale did not complete");
                }
                if err.is_unexpected() {
                    tracing::error!(
                        trip_id = %request.trip_id,
                        return_trip_id = ?request.return_trip_id,
                        passengers = %passenger_summary(&request.passengers),
                        error = %err,
                        "Booking failed"
                    );
                }
                Err(err)
            }
        }
    }

    async fn sell(
        &self,
        txn: &DatabaseTransaction,
        req: &SaleRequest,
    ) -> Result<CreatedBooking, BookingRepositoryError> {
        let now = Utc::now();

        // Guest checkout creates the owner first.
        let mut recipient = None;
        let owner = match (req.purchaser, &req.guest_account) {
            (Some(id), _) => Some(id),
            (None, Some(guest)) => {
                let user = insert_guest(txn, guest).await?;
                recipient = Some(user.email);
                Some(UserId::from_uuid(user.id))
            }
            (None, None) => None,
        };
        if recipient.is_none()
            && let Some(owner) = owner
        {
            recipient = users::Entity::find_by_id(owner.into_inner())
                .one(txn)
                .await?
                .map(|u| u.email);
        }

        let mut outbound = None;
        let mut inbound = None;
        for id in lock_order(std::iter::once(req.trip_id).chain(req.return_trip_id)) {
            let (_, snapshot) = load_trip(txn, id, RowLock::ForUpdate).await?;
            if id == req.trip_id {
                outbound = Some(snapshot);
            } else {
                inbound = Some(snapshot);
            }
        }
        let outbound = outbound.ok_or(BookingError::TripNotFound(req.trip_id))?;

        let mut wallet = match req.subscription_id {
            Some(id) => load_wallet(txn, id, RowLock::ForUpdate).await?,
            None => None,
        };

        let mut session = None;
        if let Some(ctx) = &req.desk {
            if req.seller != Some(ctx.cashier_id) {
                return Err(CashSessionError::Mismatch(ctx.session_id).into());
            }
            let state = load_session(txn, ctx.session_id, RowLock::ForUpdate)
                .await?
                .ok_or(CashSessionError::SessionNotFound(ctx.session_id))?;
            CashSessionService::verify_context(&state, ctx)?;
            session = Some(state);
        }

        let plan = self.planner.plan_sale(
            req,
            &outbound,
            inbound.as_ref(),
            wallet.as_mut(),
            owner,
            now,
        )?;

        if let (Some(state), Some(ctx)) = (session.as_mut(), req.desk.as_ref()) {
            CashSessionService::accrue(state, ctx, plan.payable_total)?;
        }

        let reference = generate_reference();
        let booking = bookings::ActiveModel {
            id: Set(plan.booking_id.into_inner()),
            booking_reference: Set(reference.clone()),
            trip_id: Set(req.trip_id.into_inner()),
            return_trip_id: Set(req.return_trip_id.map(TripId::into_inner)),
            user_id: Set(owner.map(UserId::into_inner)),
            cash_desk_id: Set(req.desk.map(|c| c.desk_id.into_inner())),
            cash_session_id: Set(req.desk.map(|c| c.session_id.into_inner())),
            total_amount: Set(plan.payable_total),
            status: Set(db_enums::BookingStatus::Confirmed),
            payment_method: Set(plan.payment_method.into()),
            created_by: Set(req.seller.map(UserId::into_inner)),
            cancelled_at: Set(None),
            cancelled_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await?;

        let mut ticket_rows = Vec::with_capacity(plan.tickets.len());
        for ticket in &plan.tickets {
            let subscription_id = match ticket.settlement {
                Settlement::WalletCovered {
                    subscription_id, ..
                } => Some(subscription_id.into_inner()),
                Settlement::FullPrice { .. } => None,
            };
            let row = tickets::ActiveModel {
                id: Set(ticket.id.into_inner()),
                booking_id: Set(booking.id),
                trip_id: Set(ticket.trip_id.into_inner()),
                return_trip_id: Set(ticket.return_trip_id.map(TripId::into_inner)),
                passenger_name: Set(ticket.passenger_name.clone()),
                passenger_type: Set(ticket.passenger_type.into()),
                nationality_group: Set(ticket.nationality_group.into()),
                fare_amount: Set(ticket.fare_amount),
                price_paid: Set(ticket.settlement.price_paid()),
                subscription_id: Set(subscription_id),
                status: Set(db_enums::TicketStatus::Issued),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(txn)
            .await?;
            ticket_rows.push(row);
        }

        let mut ledger = Vec::with_capacity(2);
        for line in sale_lines(&plan, &reference) {
            ledger.push(insert_line(txn, booking.id, &line, req.seller, now).await?);
        }

        if let Some(wallet) = &wallet
            && plan.wallet_tickets().next().is_some()
        {
            save_balance(txn, wallet, now).await?;
        }

        let seats = plan.seat_count();
        for trip in std::iter::once(&outbound).chain(inbound.as_ref()) {
            let left = take_seats(trip.available_seats, seats).ok_or_else(|| {
                BookingRepositoryError::Internal(format!(
                    "trip {} cannot give {seats} seats after planning",
                    trip.id
                ))
            })?;
            set_available_seats(txn, trip.id, left, now).await?;
        }

        if let Some(state) = &session {
            save_expected(txn, state).await?;
        }

        let confirmation = match recipient {
            Some(recipient) => Some(BookingConfirmation {
                recipient,
                reference,
                trip_label: route_label(txn, outbound.route_id).await?,
                departure_time: outbound.departure_time,
                return_departure_time: inbound.as_ref().map(|t| t.departure_time),
                tickets: plan
                    .tickets
                    .iter()
                    .map(|t| ConfirmationTicket {
                        passenger_name: t.passenger_name.clone(),
                        passenger_type: t.passenger_type,
                        price_paid: t.settlement.price_paid(),
                        wallet_covered: t.settlement.is_wallet_covered(),
                    })
                    .collect(),
                total_amount: plan.payable_total,
            }),
            None => None,
        };

        Ok(CreatedBooking {
            details: BookingDetails {
                booking,
                tickets: ticket_rows,
                transactions: ledger,
            },
            confirmation,
        })
    }

    /// Cancels a booking and gives its seats back.
    ///
    /// Tickets keep their prices. A pending negative transaction records the
    /// refund owed for what was paid outside the wallet; wallet credits are
    /// not restored.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` for an unknown booking
    /// - `AlreadyCancelled`, `NotAllowed` or `PastDeparture` from the rules
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        actor: CancellationActor,
    ) -> Result<BookingDetails, BookingRepositoryError> {
        // Unlocked read to learn which trips to lock first.
        let preview = load_details(&self.db, booking_id, RowLock::None)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        let snapshot = preview.snapshot();
        let trip_ids = lock_order(trips_held(&snapshot).into_iter().chain([snapshot.trip_id]));

        let txn = self.db.begin().await?;
        match Self::cancel(&txn, booking_id, &trip_ids, &actor).await {
            Ok(details) => {
                txn.commit().await?;
                tracing::info!(
                    booking_id = %booking_id,
                    actor = %actor.user_id,
                    role = %actor.role,
                    "Booking cancelled"
                );
                Ok(details)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed cancellation did not complete");
                }
                if err.is_unexpected() {
                    tracing::error!(booking_id = %booking_id, error = %err, "Cancellation failed");
                }
                Err(err)
            }
        }
    }

    async fn cancel(
        txn: &DatabaseTransaction,
        booking_id: BookingId,
        trip_ids: &[TripId],
        actor: &CancellationActor,
    ) -> Result<BookingDetails, BookingRepositoryError> {
        let now = Utc::now();

        let mut trips: BTreeMap<TripId, TripSnapshot> = BTreeMap::new();
        for id in trip_ids {
            let (_, snapshot) = load_trip(txn, *id, RowLock::ForUpdate).await?;
            trips.insert(*id, snapshot);
        }

        let details = load_details(txn, booking_id, RowLock::ForUpdate)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;
        let snapshot = details.snapshot();
        let outbound = trips.get(&snapshot.trip_id).ok_or_else(|| {
            BookingRepositoryError::Internal(format!("trip {} was not locked", snapshot.trip_id))
        })?;

        let plan = plan_cancellation(&snapshot, actor, outbound.departure_time, now)?;

        bookings::ActiveModel {
            id: Unchanged(booking_id.into_inner()),
            status: Set(db_enums::BookingStatus::Cancelled),
            cancelled_at: Set(Some(now.into())),
            cancelled_by: Set(Some(actor.user_id.into_inner())),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .update(txn)
        .await?;

        for ticket_id in &plan.cancelled_tickets {
            tickets::ActiveModel {
                id: Unchanged(ticket_id.into_inner()),
                status: Set(db_enums::TicketStatus::Cancelled),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .update(txn)
            .await?;
        }

        for (trip_id, count) in &plan.seat_restores {
            let trip = trips.get(trip_id).ok_or_else(|| {
                BookingRepositoryError::Internal(format!("trip {trip_id} was not locked"))
            })?;
            let restored = restore_seats(trip.available_seats, trip.capacity, *count);
            if restored.clamped {
                tracing::warn!(
                    trip_id = %trip_id,
                    available = trip.available_seats,
                    restoring = count,
                    capacity = trip.capacity,
                    "Seat restore clamped to ship capacity"
                );
            }
            set_available_seats(txn, *trip_id, restored.available, now).await?;
        }

        if let Some(refund) = &plan.refund {
            insert_line(txn, details.booking.id, refund, Some(actor.user_id), now).await?;
        }

        load_details(txn, booking_id, RowLock::None)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(booking_id).into())
    }

    /// Gets a booking with its tickets and transactions.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` for an unknown booking.
    pub async fn get_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<BookingDetails, BookingRepositoryError> {
        load_details(&self.db, booking_id, RowLock::None)
            .await?
            .ok_or_else(|| BookingError::BookingNotFound(booking_id).into())
    }
}

async fn load_details<C: ConnectionTrait>(
    conn: &C,
    booking_id: BookingId,
    lock: RowLock,
) -> Result<Option<BookingDetails>, DbErr> {
    let mut query = bookings::Entity::find_by_id(booking_id.into_inner());
    if lock == RowLock::ForUpdate {
        query = query.lock_exclusive();
    }
    let Some(booking) = query.one(conn).await? else {
        return Ok(None);
    };

    let tickets = tickets::Entity::find()
        .filter(tickets::Column::BookingId.eq(booking.id))
        .order_by_asc(tickets::Column::Id)
        .all(conn)
        .await?;
    let transactions = transactions::Entity::find()
        .filter(transactions::Column::BookingId.eq(booking.id))
        .order_by_asc(transactions::Column::CreatedAt)
        .order_by_asc(transactions::Column::Id)
        .all(conn)
        .await?;

    Ok(Some(BookingDetails {
        booking,
        tickets,
        transactions,
    }))
}

async fn insert_line<C: ConnectionTrait>(
    conn: &C,
    booking_id: Uuid,
    line: &LedgerLine,
    created_by: Option<UserId>,
    now: DateTime<Utc>,
) -> Result<transactions::Model, BookingRepositoryError> {
    let credits_used = i32::try_from(line.credits_used).map_err(|_| {
        BookingRepositoryError::Internal(format!("{} credits overflow", line.credits_used))
    })?;

    let row = transactions::ActiveModel {
        id: Set(TransactionId::new().into_inner()),
        booking_id: Set(booking_id),
        amount: Set(line.amount),
        payment_method: Set(line.payment_method.into()),
        status: Set(line.status.into()),
        subscription_id: Set(line.subscription_id.map(SubscriptionId::into_inner)),
        credits_used: Set(credits_used),
        description: Set(Some(line.description.clone())),
        created_by: Set(created_by.map(UserId::into_inner)),
        created_at: Set(now.into()),
    }
    .insert(conn)
    .await?;

    Ok(row)
}

/// "2 adult/national, 1 child/african" style summary for logs.
fn passenger_summary(passengers: &[PassengerInput]) -> String {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for p in passengers {
        *counts
            .entry((p.passenger_type.as_str(), p.nationality_group.as_str()))
            .or_default() += 1;
    }
    counts
        .iter()
        .map(|((pt, ng), n)| format!("{n} {pt}/{ng}"))
        .collect::<Vec<_>>()
        .join(", ")
}
