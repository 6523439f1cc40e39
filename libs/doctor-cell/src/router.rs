use axum::{
    Router,
    routing::{get, delete},
    middleware,
};

use shared_utils::extractor::{admin_middleware, auth_middleware};
use shared_utils::AppState;

use crate::handlers;

pub fn doctor_routes(state: AppState) -> Router {
    // Every doctor operation is admin only
    let admin_routes = Router::new()
        .route("/doctors", get(handlers::list_doctors).post(handlers::create_doctor))
        .route("/doctors/{email}", delete(handlers::delete_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(admin_routes)
        .with_state(state)
}
