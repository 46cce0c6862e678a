//! Booking routes: self-service checkout, reads and cancellation.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{AppState, error::error_response, middleware::AuthUser};
use navette_core::auth::GuestAccountRequest;
use navette_core::reservation::{
    BookingConfirmation, CancellationActor, PassengerInput, PaymentMethod, ReservationPlanner,
    SaleRequest,
};
use navette_db::BookingRepository;
use navette_shared::{
    AppError,
    types::{BookingId, SubscriptionId, TripId},
};

/// Routes open to anonymous and signed-in buyers.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/bookings", post(create_booking))
}

/// Routes that need a signed-in user.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings/{booking_id}", get(get_booking))
        .route("/bookings/{booking_id}/cancel", post(cancel_booking))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for a self-service booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Outbound trip.
    pub trip_id: TripId,
    /// Return trip, for round trips.
    pub return_trip_id: Option<TripId>,
    /// Passengers, in the order wallet coverage is applied.
    pub passengers: Vec<PassengerInput>,
    /// Method for whatever a subscription does not cover.
    pub payment_method: PaymentMethod,
    /// Subscription to draw from.
    pub subscription_id: Option<SubscriptionId>,
    /// Account to create when checking out without signing in.
    pub guest_account: Option<GuestAccountRequest>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/bookings` - Book seats as a signed-in customer or a guest.
async fn create_booking(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Json(payload): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    let request = SaleRequest {
        trip_id: payload.trip_id,
        return_trip_id: payload.return_trip_id,
        passengers: payload.passengers,
        payment_method: payload.payment_method,
        subscription_id: payload.subscription_id,
        desk: None,
        purchaser: auth.map(|a| a.user_id()),
        guest_account: payload.guest_account,
        seller: None,
    };

    sell(&state, request).await
}

/// GET `/bookings/{booking_id}` - Booking with its tickets and ledger.
async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<BookingId>,
) -> impl IntoResponse {
    let repo = BookingRepository::new((*state.db).clone());

    match repo.get_booking(booking_id).await {
        Ok(details) if details.is_visible_to(auth.user_id(), auth.role()) => {
            (StatusCode::OK, Json(details)).into_response()
        }
        Ok(_) => error_response(&AppError::Forbidden(
            "booking belongs to another user".into(),
        )),
        Err(e) => error_response(&e),
    }
}

/// POST `/bookings/{booking_id}/cancel` - Cancel a booking and give back its seats.
async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<BookingId>,
) -> impl IntoResponse {
    let repo = BookingRepository::new((*state.db).clone());
    let actor = CancellationActor {
        user_id: auth.user_id(),
        role: auth.role(),
    };

    match repo.cancel_booking(booking_id, actor).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Runs a sale and answers with the created booking.
///
/// The confirmation email is sent after the response is decided and cannot
/// affect it.
pub(crate) async fn sell(state: &AppState, request: SaleRequest) -> Response {
    let planner = ReservationPlanner::new(state.booking.max_passengers_per_booking);
    let repo = BookingRepository::with_planner((*state.db).clone(), planner);

    match repo.create_booking(request).await {
        Ok(created) => {
            if let Some(confirmation) = created.confirmation {
                send_confirmation(state, confirmation);
            }
            (StatusCode::CREATED, Json(created.details)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn send_confirmation(state: &AppState, confirmation: BookingConfirmation) {
    if !state.booking.send_confirmations {
        return;
    }

    let email = Arc::clone(&state.email_service);
    tokio::spawn(async move {
        let body = confirmation.body(email.frontend_url());
        match email
            .send_email(&confirmation.recipient, &confirmation.subject(), &body)
            .await
        {
            Ok(()) => tracing::info!(
                reference = %confirmation.reference,
                recipient = %confirmation.recipient,
                "Booking confirmation sent"
            ),
            Err(e) => tracing::warn!(
                reference = %confirmation.reference,
                error = %e,
                "Booking confirmation not sent"
            ),
        }
    });
}
