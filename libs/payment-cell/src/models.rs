use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PAYMENT_CURRENCY: &str = "usd";

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub price: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// The subset of a Stripe PaymentIntent this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Payment provider error: {message}")]
    ProviderError { message: String },

    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}
