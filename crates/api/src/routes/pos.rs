//! Point-of-sale routes.
//!
//! A desk sale is a booking made by a cashier, supervisor or admin through
//! their own open cash session. Whatever the customer pays outside a
//! subscription is added to that session's expected amount.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use crate::{AppState, error::error_response, middleware::AuthUser, routes::bookings::sell};
use navette_core::auth::GuestAccountRequest;
use navette_core::cash::{CashSessionError, DeskContext};
use navette_core::reservation::{PassengerInput, PaymentMethod, SaleRequest};
use navette_db::{CashSessionRepository, CashSessionRepositoryError, UserRepository};
use navette_shared::{
    AppError,
    types::{SubscriptionId, TripId, UserId},
};

/// Creates the point-of-sale routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/pos/sales", post(create_sale))
}

/// Request body for a desk sale.
#[derive(Debug, Deserialize)]
pub struct PosSaleRequest {
    /// Outbound trip.
    pub trip_id: TripId,
    /// Return trip, for round trips.
    pub return_trip_id: Option<TripId>,
    /// Passengers, in the order wallet coverage is applied.
    pub passengers: Vec<PassengerInput>,
    /// How the customer pays at the desk.
    pub payment_method: PaymentMethod,
    /// Customer's subscription, if one is presented.
    pub subscription_id: Option<SubscriptionId>,
    /// Existing customer account the booking belongs to.
    pub customer_id: Option<UserId>,
    /// Account to create for a walk-in customer.
    pub guest_account: Option<GuestAccountRequest>,
}

/// POST `/pos/sales` - Sell seats at the seller's cash desk.
async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PosSaleRequest>,
) -> impl IntoResponse {
    let seller = auth.user_id();
    if !auth.role().can_sell_at_desk() {
        return error_response(&AppError::Forbidden(
            "only cashiers, supervisors and admins sell at a desk".into(),
        ));
    }

    let sessions = CashSessionRepository::new((*state.db).clone());
    let session = match sessions.current(seller).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return error_response(&CashSessionRepositoryError::from(
                CashSessionError::NoOpenSession,
            ));
        }
        Err(e) => return error_response(&e),
    };

    if let Some(customer_id) = payload.customer_id {
        let users = UserRepository::new((*state.db).clone());
        match users.find_by_id(customer_id.into_inner()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return error_response(&AppError::NotFound(format!(
                    "customer {customer_id}"
                )));
            }
            Err(e) => return error_response(&AppError::Database(e.to_string())),
        }
    }

    let request = SaleRequest {
        trip_id: payload.trip_id,
        return_trip_id: payload.return_trip_id,
        passengers: payload.passengers,
        payment_method: payload.payment_method,
        subscription_id: payload.subscription_id,
        desk: Some(DeskContext::for_session(&session)),
        purchaser: payload.customer_id,
        guest_account: payload.guest_account,
        seller: Some(seller),
    };

    sell(&state, request).await
}
