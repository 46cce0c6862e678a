//! Booking cancellation.
//!
//! Cancelling flips the booking and its active tickets to `cancelled`, gives
//! their seats back to every trip they hold, and records a pending refund for
//! what was paid. Price fields are left untouched and wallet credits are not
//! restored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use navette_shared::types::{BookingId, TicketId, TripId, UserId};

use crate::auth::UserRole;
use crate::reservation::error::BookingError;
use crate::reservation::ledger::refund_line;
use crate::reservation::types::{BookingSnapshot, BookingStatus, LedgerLine};

/// Who is cancelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationActor {
    /// Actor's user ID.
    pub user_id: UserId,
    /// Actor's role.
    pub role: UserRole,
}

/// Everything a cancellation writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationPlan {
    /// Booking being cancelled.
    pub booking_id: BookingId,
    /// Tickets to flip to cancelled.
    pub cancelled_tickets: Vec<TicketId>,
    /// Seats to give back per trip, ascending by trip id.
    pub seat_restores: BTreeMap<TripId, u32>,
    /// Pending refund obligation.
    pub refund: Option<LedgerLine>,
}

/// Trips a booking's tickets hold seats on, ascending by id.
#[must_use]
pub fn trips_held(booking: &BookingSnapshot) -> Vec<TripId> {
    let mut ids: Vec<TripId> = booking
        .tickets
        .iter()
        .flat_map(|t| std::iter::once(t.trip_id).chain(t.return_trip_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Plans the cancellation of `booking` by `actor`.
///
/// `outbound_departure` is the departure of the booking's outbound trip.
///
/// # Errors
///
/// - `AlreadyCancelled` if the booking is cancelled
/// - `NotAllowed` if a non-privileged actor neither owns nor sold the booking
/// - `PastDeparture` if a non-privileged actor cancels after departure
pub fn plan_cancellation(
    booking: &BookingSnapshot,
    actor: &CancellationActor,
    outbound_departure: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<CancellationPlan, BookingError> {
    if booking.status == BookingStatus::Cancelled {
        return Err(BookingError::AlreadyCancelled(booking.id));
    }

    if !actor.role.is_privileged() {
        let involved = booking.owner_id == Some(actor.user_id)
            || booking.created_by == Some(actor.user_id);
        if !involved {
            return Err(BookingError::NotAllowed("cancel this booking"));
        }
    }

    if !actor.role.can_cancel_after_departure() && outbound_departure <= now {
        return Err(BookingError::PastDeparture(booking.trip_id));
    }

    let mut cancelled_tickets = Vec::new();
    let mut seat_restores: BTreeMap<TripId, u32> = BTreeMap::new();
    let mut refund_amount = Decimal::ZERO;

    for ticket in booking.tickets.iter().filter(|t| t.status.is_active()) {
        cancelled_tickets.push(ticket.id);
        *seat_restores.entry(ticket.trip_id).or_default() += 1;
        if let Some(return_trip_id) = ticket.return_trip_id {
            *seat_restores.entry(return_trip_id).or_default() += 1;
        }
        refund_amount += ticket.price_paid;
    }

    Ok(CancellationPlan {
        booking_id: booking.id,
        cancelled_tickets,
        seat_restores,
        refund: refund_line(refund_amount, booking.payment_method, &booking.reference),
    })
}
