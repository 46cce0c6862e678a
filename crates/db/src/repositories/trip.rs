//! Trip loading for sales, cancellations and fare quotes.
//!
//! A trip is read together with its ship capacity and its route's pricing
//! rules into a [`TripSnapshot`]. When loaded inside a sale or cancellation
//! the trip row is locked `FOR UPDATE`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, Unchanged,
};

use navette_core::pricing::{PricingError, PricingRule, TripFareTable};
use navette_core::reservation::TripSnapshot;
use navette_shared::types::{PricingRuleId, RouteId, TripId};

use crate::entities::{ports, pricing_rules, routes, ships, trips};

/// Error types for loading trips.
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    /// Trip not found.
    #[error("Trip not found: {0}")]
    NotFound(TripId),

    /// The trip's fare table cannot be read.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A stored value is outside its domain.
    #[error("Corrupt row for trip {0}: {1}")]
    Corrupt(TripId, String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Whether to take a row lock while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowLock {
    None,
    ForUpdate,
}

/// Reads a trip and everything needed to sell it.
pub(crate) async fn load_trip<C: ConnectionTrait>(
    conn: &C,
    id: TripId,
    lock: RowLock,
) -> Result<(trips::Model, TripSnapshot), TripError> {
    let mut query = trips::Entity::find_by_id(id.into_inner());
    if lock == RowLock::ForUpdate {
        query = query.lock_exclusive();
    }
    let trip = query.one(conn).await?.ok_or(TripError::NotFound(id))?;

    let ship = ships::Entity::find_by_id(trip.ship_id)
        .one(conn)
        .await?
        .ok_or_else(|| TripError::Corrupt(id, format!("ship {} is missing", trip.ship_id)))?;

    let rules = pricing_rules::Entity::find()
        .filter(pricing_rules::Column::RouteId.eq(trip.route_id))
        .order_by_asc(pricing_rules::Column::CreatedAt)
        .all(conn)
        .await?;

    let snapshot = to_snapshot(&trip, &ship, rules)?;
    Ok((trip, snapshot))
}

fn to_snapshot(
    trip: &trips::Model,
    ship: &ships::Model,
    rules: Vec<pricing_rules::Model>,
) -> Result<TripSnapshot, TripError> {
    let id = TripId::from_uuid(trip.id);
    let seats = |value: i32, what: &str| {
        u32::try_from(value).map_err(|_| TripError::Corrupt(id, format!("{what} is {value}")))
    };

    let fare_table = match &trip.pricing_settings {
        Some(json) => TripFareTable::from_json(json)?,
        None => None,
    };

    Ok(TripSnapshot {
        id,
        route_id: RouteId::from_uuid(trip.route_id),
        status: trip.status.into(),
        departure_time: trip.departure_time.with_timezone(&Utc),
        available_seats: seats(trip.available_seats_pax, "available_seats_pax")?,
        capacity: seats(ship.capacity_pax, "capacity_pax")?,
        fare_table,
        pricing_rules: rules.into_iter().map(to_rule).collect(),
    })
}

fn to_rule(model: pricing_rules::Model) -> PricingRule {
    PricingRule {
        id: PricingRuleId::from_uuid(model.id),
        route_id: RouteId::from_uuid(model.route_id),
        passenger_type: model.passenger_type.into(),
        nationality_group: model.nationality_group.into(),
        base_price: model.base_price,
        tax_amount: model.tax_amount,
        is_active: model.is_active,
    }
}

/// Writes a new seat count on a locked trip.
pub(crate) async fn set_available_seats<C: ConnectionTrait>(
    conn: &C,
    id: TripId,
    available: u32,
    now: DateTime<Utc>,
) -> Result<(), TripError> {
    let seats = i32::try_from(available)
        .map_err(|_| TripError::Corrupt(id, format!("seat count {available} overflows")))?;

    trips::ActiveModel {
        id: Unchanged(id.into_inner()),
        available_seats_pax: Set(seats),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .update(conn)
    .await?;

    Ok(())
}

/// Human-readable "Departure → Arrival" label for a trip's route.
pub(crate) async fn route_label<C: ConnectionTrait>(
    conn: &C,
    route_id: RouteId,
) -> Result<String, DbErr> {
    let Some(route) = routes::Entity::find_by_id(route_id.into_inner()).one(conn).await? else {
        return Ok(String::new());
    };
    let name = |port: Option<ports::Model>| port.map_or_else(|| "?".to_string(), |p| p.name);

    let from = ports::Entity::find_by_id(route.departure_port_id).one(conn).await?;
    let to = ports::Entity::find_by_id(route.arrival_port_id).one(conn).await?;
    Ok(format!("{} → {}", name(from), name(to)))
}
