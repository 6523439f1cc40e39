use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use shared_database::{store::ID_FIELD, Collection, Document, DocumentStore, Filter};

use crate::models::{BookedSlot, Service};
use crate::services::availability::available_slots;

pub struct TreatmentService {
    store: Arc<dyn DocumentStore>,
}

impl TreatmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All services, optionally projected down to `fields` (plus `_id`).
    pub async fn list_services(&self, fields: Option<&[String]>) -> Result<Vec<Document>> {
        let services = self.store.find(Collection::Services, &Filter::new()).await?;
        debug!("Fetched {} services", services.len());

        Ok(match fields {
            Some(fields) => services
                .into_iter()
                .map(|service| project(service, fields))
                .collect(),
            None => services,
        })
    }

    /// Services with the slots already booked on `slot_date` removed.
    /// Documents that do not have the expected shape are skipped.
    pub async fn available_on(&self, slot_date: &str) -> Result<Vec<Service>> {
        let services: Vec<Service> = decode_all(
            Collection::Services,
            self.store.find(Collection::Services, &Filter::new()).await?,
        );

        let bookings: Vec<BookedSlot> = decode_all(
            Collection::Bookings,
            self.store
                .find(Collection::Bookings, &Filter::new().eq("slotDate", slot_date))
                .await?,
        );

        debug!("{} bookings found for {}", bookings.len(), slot_date);

        Ok(available_slots(services, &bookings, slot_date))
    }
}

fn decode_all<T: DeserializeOwned>(collection: Collection, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get(ID_FIELD).cloned().unwrap_or(Value::Null);
            match serde_json::from_value(Value::Object(document)) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    warn!("Skipping malformed {} document {}: {}", collection, id, e);
                    None
                }
            }
        })
        .collect()
}

fn project(document: Document, fields: &[String]) -> Document {
    document
        .into_iter()
        .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|f| f == key))
        .collect()
}
