//! Pricing error types.

use thiserror::Error;

use super::types::{NationalityGroup, PassengerType};

/// Errors that can occur while resolving a fare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// No trip category and no route rule covers the combination.
    #[error("No fare found for {passenger_type} passenger ({nationality_group})")]
    PriceNotFound {
        /// Passenger type requested.
        passenger_type: PassengerType,
        /// Nationality group requested.
        nationality_group: NationalityGroup,
    },

    /// The trip's override fare table cannot be used.
    #[error("Invalid trip fare table: {0}")]
    InvalidFareTable(String),
}

impl PricingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PriceNotFound { .. } => "PRICE_NOT_FOUND",
            Self::InvalidFareTable(_) => "INVALID_FARE_TABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        422
    }
}
