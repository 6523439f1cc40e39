use axum::{routing::get, Router};
use tracing::{error, info};

use booking_cell::router::booking_routes;
use doctor_cell::router::doctor_routes;
use payment_cell::router::payment_routes;
use shared_config::AppConfig;
use shared_database::open_store;
use shared_utils::AppState;
use treatment_cell::router::treatment_routes;
use user_cell::router::user_routes;

pub const LIVENESS_MESSAGE: &str = "Clinic Portal is running!";

fn liveness_routes() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_MESSAGE }))
}

pub fn create_router(state: AppState) -> Router {
    liveness_routes()
        .merge(treatment_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(booking_routes(state.clone()))
        .merge(payment_routes(state.clone()))
        .merge(doctor_routes(state))
}

/// Opens the store and checks it answers before mounting any data route.
/// When it does not, only the liveness route is served.
pub async fn build_app(config: AppConfig) -> Router {
    let store = match open_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open document store: {:#}", e);
            return liveness_routes();
        }
    };

    if let Err(e) = store.ping().await {
        error!("Document store unreachable, serving liveness only: {:#}", e);
        return liveness_routes();
    }

    info!("Document store connected");
    create_router(AppState::new(config, store))
}
