//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::auth::{auth_middleware, optional_auth_middleware},
};

pub mod bookings;
pub mod cash_sessions;
pub mod fares;
pub mod health;
pub mod pos;

/// Creates the API router with the routes that need no authentication.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::routes()).merge(fares::routes())
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Self-service checkout works signed in or as a guest
    let checkout_routes = Router::new()
        .merge(bookings::checkout_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(bookings::routes())
        .merge(pos::routes())
        .merge(cash_sessions::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    api_routes()
        .merge(checkout_routes)
        .merge(protected_routes)
}
