use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use shared_database::{Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult};

use crate::models::{CreateDoctorRequest, DoctorError};

pub struct DoctorService {
    store: Arc<dyn DocumentStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a new doctor profile. Emails are unique.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<InsertResult> {
        let email = request.email.trim().to_string();
        if email.is_empty() {
            return Err(DoctorError::MissingEmail.into());
        }
        debug!("Creating new doctor profile for: {}", email);

        let existing = self
            .store
            .find_one(Collection::Doctors, &Filter::new().eq("email", email.as_str()))
            .await?;
        if existing.is_some() {
            return Err(DoctorError::AlreadyExists(email).into());
        }

        let result = self
            .store
            .insert_one(
                Collection::Doctors,
                CreateDoctorRequest { email, ..request }.into_document(),
            )
            .await?;

        info!("Doctor profile created with ID: {}", result.inserted_id);
        Ok(result)
    }

    pub async fn list_doctors(&self) -> Result<Vec<Document>> {
        self.store.find(Collection::Doctors, &Filter::new()).await
    }

    pub async fn delete_doctor(&self, email: &str) -> Result<DeleteResult> {
        let result = self
            .store
            .delete_one(Collection::Doctors, &Filter::new().eq("email", email))
            .await?;

        info!("Deleted {} doctor profile(s) for {}", result.deleted_count, email);
        Ok(result)
    }
}
