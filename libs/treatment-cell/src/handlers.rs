use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{AvailableQuery, ServicesQuery};
use crate::services::TreatmentService;

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<Value>, AppError> {
    let fields: Option<Vec<String>> = query.fields.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from)
            .collect()
    });

    let service = TreatmentService::new(state.store.clone());
    let services = service
        .list_services(fields.as_deref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(services)))
}

#[axum::debug_handler]
pub async fn available_services(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>, AppError> {
    let slot_date = query
        .slot_date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("slotDate is required".to_string()))?;

    let service = TreatmentService::new(state.store.clone());
    let services = service
        .available_on(&slot_date)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(services)))
}
