use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use shared_config::{AppConfig, DatabaseBackend};
use shared_database::{Collection, Document, MemoryStore};
use shared_models::auth::TokenClaims;

use crate::jwt::issue_token;
use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            stripe_secret_key: "sk_test_123".to_string(),
            stripe_api_base: "http://localhost:12111".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_stripe_base(base: &str) -> Self {
        Self {
            stripe_api_base: base.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_backend: DatabaseBackend::Memory,
            database_url: String::new(),
            database_service_key: String::new(),
            seed_file: None,
            access_token_secret: self.jwt_secret.clone(),
            stripe_secret_key: self.stripe_secret_key.clone(),
            stripe_api_base: self.stripe_api_base.clone(),
            port: 0,
        }
    }
}

pub struct TestUser {
    pub email: String,
    pub role: Option<String>,
}

impl TestUser {
    pub fn patient(email: &str) -> Self {
        Self {
            email: email.to_string(),
            role: None,
        }
    }

    pub fn admin(email: &str) -> Self {
        Self {
            email: email.to_string(),
            role: Some("admin".to_string()),
        }
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        document.insert("email".to_string(), json!(self.email));
        if let Some(role) = &self.role {
            document.insert("role".to_string(), json!(role));
        }
        document
    }
}

/// A memory-backed `AppState` plus helpers for seeding and minting tokens.
pub struct TestState {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new()
    }
}

impl TestState {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(config: TestConfig) -> Self {
        Self {
            config: config.to_app_config(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.config.clone(), self.store.clone())
    }

    pub fn token_for(&self, email: &str) -> String {
        issue_token(email, &self.config.access_token_secret).expect("test secret is set")
    }

    pub fn bearer_for(&self, email: &str) -> String {
        format!("Bearer {}", self.token_for(email))
    }

    pub async fn add_user(&self, user: &TestUser) {
        self.store.seed(Collection::Users, vec![user.to_document()]).await;
    }

    pub async fn add_documents(&self, collection: Collection, documents: Vec<Value>) {
        let documents = documents
            .into_iter()
            .filter_map(|value| value.as_object().cloned())
            .collect();
        self.store.seed(collection, documents).await;
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(email: &str, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(1));

        let claims = TokenClaims {
            email: email.to_string(),
            iat: now.timestamp().max(0) as u64,
            exp: exp.timestamp().max(0) as u64,
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("HMAC can take key of any size")
    }

    pub fn create_expired_token(email: &str, secret: &str) -> String {
        Self::create_test_token(email, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(email: &str) -> String {
        Self::create_test_token(email, "wrong-secret", Some(1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
