use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::AppState;

use crate::models::{BookingListQuery, BookingOutcome, CompletePaymentRequest, CreateBookingRequest};
use crate::services::BookingService;

/// Patients may only list their own bookings.
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Value>, AppError> {
    let patient_email = query.patient_email.unwrap_or_default();
    if patient_email != user.email {
        warn!("{} tried to list bookings of '{}'", user.email, patient_email);
        return Err(AppError::forbidden());
    }

    let service = BookingService::new(state.store.clone());
    let bookings = service
        .bookings_for_patient(&patient_email)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(bookings)))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(state.store.clone());
    let booking = service
        .get_booking(&booking_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(booking)))
}

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> Result<Json<BookingOutcome>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = BookingService::new(state.store.clone());
    let outcome = service
        .create_booking(request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(outcome))
}

#[axum::debug_handler]
pub async fn complete_payment(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    AppJson(request): AppJson<CompletePaymentRequest>,
) -> Result<Json<Value>, AppError> {
    if request.transaction_id.trim().is_empty() {
        return Err(AppError::BadRequest("transactionId is required".to_string()));
    }

    let service = BookingService::new(state.store.clone());
    let update = service
        .complete_payment(&booking_id, request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(update)))
}
