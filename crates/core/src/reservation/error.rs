//! Reservation error types.

use thiserror::Error;

use navette_shared::types::{BookingId, SubscriptionId, TripId};

use crate::cash::CashSessionError;
use crate::pricing::PricingError;
use crate::reservation::types::TripStatus;
use crate::wallet::WalletError;

/// Errors that can occur while selling or cancelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Malformed request, rejected before any lock is taken.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Trip does not exist.
    #[error("Trip {0} not found")]
    TripNotFound(TripId),

    /// Booking does not exist.
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),

    /// Subscription does not exist.
    #[error("Subscription {0} not found")]
    SubscriptionNotFound(SubscriptionId),

    /// Trip is not open for sale.
    #[error("Trip {trip_id} is {status} and cannot be booked")]
    TripNotBookable {
        /// Trip ID.
        trip_id: TripId,
        /// Current status.
        status: TripStatus,
    },

    /// Trip has already left.
    #[error("Trip {0} has already departed")]
    PastDeparture(TripId),

    /// Not enough seats on the outbound trip.
    #[error("Only {available} seats left on trip {trip_id}, {requested} requested")]
    InsufficientSeats {
        /// Trip ID.
        trip_id: TripId,
        /// Seats requested.
        requested: u32,
        /// Seats left.
        available: u32,
    },

    /// Not enough seats on the return trip.
    #[error("Only {available} seats left on return trip {trip_id}, {requested} requested")]
    InsufficientSeatsReturn {
        /// Trip ID.
        trip_id: TripId,
        /// Seats requested.
        requested: u32,
        /// Seats left.
        available: u32,
    },

    /// Booking is already cancelled.
    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(BookingId),

    /// Actor may not touch this booking.
    #[error("Not allowed to {0}")]
    NotAllowed(&'static str),

    /// Fare resolution failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wallet check or deduction failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Cash session state prevents the sale.
    #[error(transparent)]
    CashSession(#[from] CashSessionError),
}

impl BookingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TripNotFound(_) => "TRIP_NOT_FOUND",
            Self::BookingNotFound(_) => "BOOKING_NOT_FOUND",
            Self::SubscriptionNotFound(_) => "SUBSCRIPTION_NOT_FOUND",
            Self::TripNotBookable { .. } => "TRIP_NOT_BOOKABLE",
            Self::PastDeparture(_) => "PAST_DEPARTURE",
            Self::InsufficientSeats { .. } => "INSUFFICIENT_SEATS",
            Self::InsufficientSeatsReturn { .. } => "INSUFFICIENT_SEATS_RETURN",
            Self::AlreadyCancelled(_) => "BOOKING_ALREADY_CANCELLED",
            Self::NotAllowed(_) => "FORBIDDEN",
            Self::Pricing(e) => e.error_code(),
            Self::Wallet(e) => e.error_code(),
            Self::CashSession(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::TripNotBookable { .. } => 400,
            Self::TripNotFound(_) | Self::BookingNotFound(_) | Self::SubscriptionNotFound(_) => 404,
            Self::PastDeparture(_) => 422,
            Self::InsufficientSeats { .. }
            | Self::InsufficientSeatsReturn { .. }
            | Self::AlreadyCancelled(_) => 409,
            Self::NotAllowed(_) => 403,
            Self::Pricing(e) => e.http_status_code(),
            Self::Wallet(e) => e.http_status_code(),
            Self::CashSession(e) => e.http_status_code(),
        }
    }
}
