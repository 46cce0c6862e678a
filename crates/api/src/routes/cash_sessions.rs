//! Cash session routes.
//!
//! A cashier opens a shift at a desk with a counted float, sells through it,
//! and closes it with a declared count. Supervisors and admins can close
//! anyone's shift and read any shift's summary.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::error_response, middleware::AuthUser};
use navette_db::CashSessionRepository;
use navette_shared::{
    AppError,
    types::{CashDeskId, CashSessionId},
};

/// Creates the cash session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash-sessions", post(open_session))
        .route("/cash-sessions/close", post(close_session))
        .route("/cash-sessions/current", get(current_session))
        .route("/cash-sessions/{session_id}/force-close", post(force_close_session))
        .route("/cash-sessions/{session_id}/summary", get(session_summary))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for opening a shift.
#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    /// Desk to open at.
    pub cash_desk_id: CashDeskId,
    /// Float counted into the drawer.
    pub opening_amount: Decimal,
}

/// Request body for closing a shift.
#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    /// Amount counted in the drawer.
    pub closing_amount_declared: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/cash-sessions` - Open a shift.
async fn open_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpenSessionRequest>,
) -> impl IntoResponse {
    if !auth.role().can_sell_at_desk() {
        return error_response(&AppError::Forbidden(
            "only cashiers, supervisors and admins open cash sessions".into(),
        ));
    }

    let repo = CashSessionRepository::new((*state.db).clone());
    match repo
        .open(payload.cash_desk_id, auth.user_id(), payload.opening_amount)
        .await
    {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/cash-sessions/close` - Close the caller's open shift.
async fn close_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CloseSessionRequest>,
) -> impl IntoResponse {
    let repo = CashSessionRepository::new((*state.db).clone());
    match repo
        .close(auth.user_id(), payload.closing_amount_declared, payload.notes)
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/cash-sessions/{session_id}/force-close` - Close another cashier's shift.
async fn force_close_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<CashSessionId>,
) -> impl IntoResponse {
    let role = auth.role();
    if !role.can_force_close_session() {
        return error_response(&AppError::Forbidden(
            "only supervisors and admins can force-close a session".into(),
        ));
    }

    let repo = CashSessionRepository::new((*state.db).clone());
    match repo.force_close(session_id, auth.user_id(), role).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/cash-sessions/current` - The caller's open shift, if any.
async fn current_session(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CashSessionRepository::new((*state.db).clone());
    match repo.current(auth.user_id()).await {
        Ok(session) => (
            StatusCode::OK,
            Json(json!({ "is_open": session.is_some(), "session": session })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/cash-sessions/{session_id}/summary` - End-of-shift figures.
async fn session_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<CashSessionId>,
) -> impl IntoResponse {
    let repo = CashSessionRepository::new((*state.db).clone());

    let session = match repo.get(session_id).await {
        Ok(session) => session,
        Err(e) => return error_response(&e),
    };
    if session.cashier_id != auth.user_id() && !auth.role().is_privileged() {
        return error_response(&AppError::Forbidden(
            "session belongs to another cashier".into(),
        ));
    }

    match repo.summary(session_id).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, header::AUTHORIZATION},
    };

    use crate::routes::test_support::{json_body, send, token};

    #[test]
    fn test_open_request_accepts_string_amounts() {
        let request: OpenSessionRequest = serde_json::from_value(json!({
            "cash_desk_id": CashDeskId::new(),
            "opening_amount": "10000.00"
        }))
        .unwrap();
        assert_eq!(request.opening_amount, Decimal::new(10000, 0));
    }

    #[tokio::test]
    async fn test_cashier_cannot_force_close() {
        let response = send(
            Request::builder()
                .method("POST")
                .uri(format!(
                    "/api/v1/cash-sessions/{}/force-close",
                    CashSessionId::new()
                ))
                .header(AUTHORIZATION, format!("Bearer {}", token("cashier")))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_customer_cannot_open_a_session() {
        let response = send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cash-sessions")
                .header(AUTHORIZATION, format!("Bearer {}", token("customer")))
                .header("Content-Type", "application/json")
                .body(Body::from(
                    json!({"cash_desk_id": CashDeskId::new(), "opening_amount": 5000}).to_string(),
                ))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_unknown_role_in_token_is_rejected() {
        let response = send(
            Request::builder()
                .uri("/api/v1/cash-sessions/current")
                .header(AUTHORIZATION, format!("Bearer {}", token("captain")))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "invalid_token");
    }
}
