use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn booking_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/booking", post(handlers::create_booking))
        .route("/booking/{id}", patch(handlers::complete_payment));

    let protected_routes = Router::new()
        .route("/booking", get(handlers::list_bookings))
        .route("/booking/{id}", get(handlers::get_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
