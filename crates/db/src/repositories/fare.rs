//! Fare quotes for a single passenger.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use navette_core::pricing::{NationalityGroup, PassengerType, PricingError, PricingResolver, ResolvedFare};
use navette_shared::types::TripId;

use super::trip::{RowLock, TripError, load_trip};

/// Error types for fare quotes.
#[derive(Debug, thiserror::Error)]
pub enum FareError {
    /// Trip could not be loaded.
    #[error(transparent)]
    Trip(#[from] TripError),

    /// No fare applies.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl FareError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Trip(TripError::NotFound(_)) => "TRIP_NOT_FOUND",
            Self::Trip(TripError::Pricing(e)) | Self::Pricing(e) => e.error_code(),
            Self::Trip(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Trip(TripError::NotFound(_)) => 404,
            Self::Trip(TripError::Pricing(e)) | Self::Pricing(e) => e.http_status_code(),
            Self::Trip(_) => 500,
        }
    }
}

/// A fare quote with the trip's departure.
#[derive(Debug, Clone)]
pub struct FareQuote {
    /// Trip ID.
    pub trip_id: TripId,
    /// Departure of the trip.
    pub departure_time: DateTime<Utc>,
    /// Resolved fare and its source.
    pub fare: ResolvedFare,
}

/// Fare repository for read-only quotes.
#[derive(Debug, Clone)]
pub struct FareRepository {
    db: DatabaseConnection,
    resolver: PricingResolver,
}

impl FareRepository {
    /// Creates a new fare repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            resolver: PricingResolver::new(),
        }
    }

    /// Quotes the one-way fare of a passenger on a trip.
    ///
    /// Nothing is locked; the price charged at sale time is resolved again
    /// under lock.
    ///
    /// # Errors
    ///
    /// Returns `Trip(NotFound)` for an unknown trip or `Pricing` if no fare applies.
    pub async fn resolve_fare(
        &self,
        trip_id: TripId,
        passenger_type: PassengerType,
        nationality_group: NationalityGroup,
    ) -> Result<FareQuote, FareError> {
        let (_, trip) = load_trip(&self.db, trip_id, RowLock::None).await?;

        let fare = self.resolver.resolve_fare(
            trip.fare_table.as_ref(),
            &trip.pricing_rules,
            passenger_type,
            nationality_group,
        )?;

        Ok(FareQuote {
            trip_id,
            departure_time: trip.departure_time,
            fare,
        })
    }
}
