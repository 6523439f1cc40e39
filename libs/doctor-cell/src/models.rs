use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use shared_database::Document;

/// A doctor profile. `email` is the key; everything else (name, specialty,
/// photo url, ...) is stored as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl CreateDoctorRequest {
    pub fn into_document(mut self) -> Document {
        self.profile.remove("_id");
        let mut document = self.profile;
        document.insert("email".to_string(), Value::String(self.email));
        document
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum DoctorError {
    #[error("email is required")]
    MissingEmail,

    #[error("Doctor with email {0} already exists")]
    AlreadyExists(String),
}
