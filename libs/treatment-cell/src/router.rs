use axum::{routing::get, Router};

use shared_utils::AppState;

use crate::handlers;

pub fn treatment_routes(state: AppState) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services))
        .route("/available", get(handlers::available_services))
        .with_state(state)
}
