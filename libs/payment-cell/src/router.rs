use axum::{middleware, routing::post, Router};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn payment_routes(state: AppState) -> Router {
    Router::new()
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
