use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_models::error::AppError;
use shared_utils::{extractor::AppJson, jwt::issue_token, AppState};

use crate::models::{AdminStatus, UpsertUserResponse};
use crate::services::UserService;

#[axum::debug_handler]
pub async fn check_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    debug!("Checking admin status for {}", email);

    let service = UserService::new(state.store.clone());
    let admin = service
        .is_admin(&email)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(AdminStatus { admin }))
}

/// Upserts the profile and hands back a fresh one-hour token every time.
#[axum::debug_handler]
pub async fn upsert_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<UpsertUserResponse>, AppError> {
    let Value::Object(fields) = body else {
        return Err(AppError::BadRequest("User body must be a JSON object".to_string()));
    };

    let service = UserService::new(state.store.clone());
    let result = service
        .upsert_user(&email, fields)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let token = issue_token(&email, &state.config.access_token_secret)
        .map_err(AppError::Internal)?;

    info!("User {} signed in", email);
    Ok(Json(UpsertUserResponse { result, token }))
}

#[axum::debug_handler]
pub async fn make_admin(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = UserService::new(state.store.clone());
    let result = service
        .make_admin(&email)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(result)))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let service = UserService::new(state.store.clone());
    let users = service
        .list_users()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(users)))
}
