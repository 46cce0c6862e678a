//! Fare quotes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::error_response};
use navette_core::pricing::{FareSource, NationalityGroup, PassengerType};
use navette_db::FareRepository;
use navette_shared::{AppError, types::TripId};

/// Creates the fare routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trips/{trip_id}/fare", get(resolve_fare))
}

/// Query parameters for a fare quote.
#[derive(Debug, Deserialize)]
pub struct FareQuery {
    /// `adult`, `child` or `baby`.
    pub passenger_type: Option<String>,
    /// `national`, `resident`, `african` or `hors_afrique`.
    pub nationality_group: Option<String>,
}

/// Response for a fare quote.
#[derive(Debug, Serialize)]
pub struct FareResponse {
    /// Trip ID.
    pub trip_id: TripId,
    /// Scheduled departure.
    pub departure_time: DateTime<Utc>,
    /// Passenger type quoted.
    pub passenger_type: PassengerType,
    /// Nationality group quoted.
    pub nationality_group: NationalityGroup,
    /// One-way fare.
    pub amount: Decimal,
    /// Where the fare came from.
    pub source: FareSource,
}

/// GET `/trips/{trip_id}/fare` - Quote a one-way fare.
async fn resolve_fare(
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Query(query): Query<FareQuery>,
) -> impl IntoResponse {
    let (passenger_type, nationality_group) = match parse_query(&query) {
        Ok(pair) => pair,
        Err(e) => return error_response(&e),
    };

    let repo = FareRepository::new((*state.db).clone());
    match repo
        .resolve_fare(trip_id, passenger_type, nationality_group)
        .await
    {
        Ok(quote) => {
            tracing::debug!(
                trip_id = %trip_id,
                passenger_type = %passenger_type,
                nationality_group = %nationality_group,
                amount = %quote.fare.amount,
                source = ?quote.fare.source,
                "Fare resolved"
            );
            (
                StatusCode::OK,
                Json(FareResponse {
                    trip_id,
                    departure_time: quote.departure_time,
                    passenger_type,
                    nationality_group,
                    amount: quote.fare.amount,
                    source: quote.fare.source,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn parse_query(query: &FareQuery) -> Result<(PassengerType, NationalityGroup), AppError> {
    let passenger_type = query
        .passenger_type
        .as_deref()
        .ok_or_else(|| AppError::Validation("passenger_type is required".into()))?
        .parse()
        .map_err(AppError::Validation)?;
    let nationality_group = query
        .nationality_group
        .as_deref()
        .ok_or_else(|| AppError::Validation("nationality_group is required".into()))?
        .parse()
        .map_err(AppError::Validation)?;
    Ok((passenger_type, nationality_group))
}
