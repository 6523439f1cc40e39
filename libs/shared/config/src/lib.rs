use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Which `DocumentStore` implementation the binary should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Postgrest,
    Memory,
}

impl DatabaseBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgrest" | "supabase" => Some(Self::Postgrest),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_backend: DatabaseBackend,
    pub database_url: String,
    pub database_service_key: String,
    pub seed_file: Option<PathBuf>,
    pub access_token_secret: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_backend = match env::var("DATABASE_BACKEND") {
            Ok(raw) => DatabaseBackend::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown DATABASE_BACKEND '{}', using postgrest", raw);
                DatabaseBackend::Postgrest
            }),
            Err(_) => DatabaseBackend::Postgrest,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT '{}' is not a valid port, using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let config = Self {
            database_backend,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    if database_backend == DatabaseBackend::Postgrest {
                        warn!("DATABASE_URL not set, using empty value");
                    }
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    if database_backend == DatabaseBackend::Postgrest {
                        warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    }
                    String::new()
                }),
            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ACCESS_TOKEN_SECRET not set, using empty value");
                    String::new()
                }),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            stripe_api_base: env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.to_string()),
            port,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let store_ready = match self.database_backend {
            DatabaseBackend::Postgrest => {
                !self.database_url.is_empty() && !self.database_service_key.is_empty()
            }
            DatabaseBackend::Memory => true,
        };

        store_ready && !self.access_token_secret.is_empty()
    }

    pub fn is_payments_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty() && !self.stripe_api_base.is_empty()
    }
}
