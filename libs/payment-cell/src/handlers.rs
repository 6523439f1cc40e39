use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::{info, warn};

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::extractor::AppJson;
use shared_utils::AppState;

use crate::models::{CreatePaymentIntentRequest, CreatePaymentIntentResponse, PaymentError, PAYMENT_CURRENCY};
use crate::services::{amount_in_minor_units, StripeClient};

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidPrice(msg) => AppError::BadRequest(msg),
            PaymentError::NotConfigured => {
                warn!("Payment intent requested but STRIPE_SECRET_KEY is not set");
                AppError::Internal(PaymentError::NotConfigured.to_string())
            }
            other => AppError::ExternalService(other.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(request): AppJson<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, AppError> {
    let price = request
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let amount = amount_in_minor_units(price)?;

    let client = StripeClient::new(&state.config)?;
    let intent = client.create_payment_intent(amount, PAYMENT_CURRENCY).await?;

    info!(
        "Payment intent {} for {} ({} {} minor units)",
        intent.id, user.email, intent.amount, intent.currency
    );
    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}
