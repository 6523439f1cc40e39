pub mod memory;
pub mod store;
pub mod supabase;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use shared_config::{AppConfig, DatabaseBackend};

pub use memory::MemoryStore;
pub use store::{Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult, UpdateResult};
pub use supabase::PostgrestStore;

/// Opens the process-wide store selected by the configuration. Connectivity
/// is not checked here; callers `ping` before serving.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.database_backend {
        DatabaseBackend::Postgrest => {
            info!("Using PostgREST document store at {}", config.database_url);
            Ok(Arc::new(PostgrestStore::new(config)))
        }
        DatabaseBackend::Memory => {
            let store = match &config.seed_file {
                Some(path) => {
                    info!("Using in-memory document store seeded from {}", path.display());
                    MemoryStore::load_seed_file(path).await?
                }
                None => {
                    info!("Using empty in-memory document store");
                    MemoryStore::new()
                }
            };
            Ok(Arc::new(store))
        }
    }
}
