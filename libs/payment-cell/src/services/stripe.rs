use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{PaymentError, PaymentIntent};

/// Converts a price in major units to the integer minor units the provider expects.
pub fn amount_in_minor_units(price: f64) -> Result<i64, PaymentError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PaymentError::InvalidPrice(format!("{} must be a positive number", price)));
    }

    let amount = (price * 100.0).round();
    if amount < 1.0 || amount > i64::MAX as f64 {
        return Err(PaymentError::InvalidPrice(format!("{} is out of range", price)));
    }

    Ok(amount as i64)
}

/// Stripe PaymentIntents client.
/// Based on: https://docs.stripe.com/api/payment_intents/create
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Result<Self, PaymentError> {
        if !config.is_payments_configured() {
            return Err(PaymentError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            base_url: config.stripe_api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a card-only payment intent.
    /// POST /v1/payment_intents
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        debug!("Creating payment intent for {} {} at {}", amount, currency, url);

        let amount_param = amount.to_string();
        let form = [
            ("amount", amount_param.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Payment intent creation failed: {} - {}", status, response_text);
            return Err(PaymentError::ProviderError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        let intent: PaymentIntent = serde_json::from_str(&response_text).map_err(|e| {
            PaymentError::ProviderError {
                message: format!("Failed to parse payment intent: {}", e),
            }
        })?;

        info!("Created payment intent {}", intent.id);
        Ok(intent)
    }
}
