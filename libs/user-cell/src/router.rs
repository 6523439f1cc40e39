use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_utils::extractor::{admin_middleware, auth_middleware};
use shared_utils::AppState;

use crate::handlers;

pub fn user_routes(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/admin/{email}", get(handlers::check_admin))
        .route("/user/{email}", put(handlers::upsert_user));

    let protected_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/user/admin/{email}", put(handlers::make_admin))
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state)
}
