use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::{DeleteResult, InsertResult};
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::AppState;

use crate::models::{CreateDoctorRequest, DoctorError};
use crate::services::doctor::DoctorService;

fn service_error(err: anyhow::Error) -> AppError {
    match err.downcast::<DoctorError>() {
        Ok(doctor_error) => AppError::BadRequest(doctor_error.to_string()),
        Err(other) => AppError::Database(other.to_string()),
    }
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateDoctorRequest>,
) -> Result<Json<InsertResult>, AppError> {
    let doctor_service = DoctorService::new(state.store.clone());

    let result = doctor_service
        .create_doctor(request)
        .await
        .map_err(service_error)?;

    Ok(Json(result))
}

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(state.store.clone());

    let doctors = doctor_service
        .list_doctors()
        .await
        .map_err(service_error)?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let doctor_service = DoctorService::new(state.store.clone());

    let result = doctor_service
        .delete_doctor(&email)
        .await
        .map_err(service_error)?;

    Ok(Json(result))
}
