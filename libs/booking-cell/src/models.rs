use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use shared_database::{Document, InsertResult};

/// Submitted by the booking form. Unknown fields are stored as sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub treatment_name: String,
    #[serde(default)]
    pub slot_date: String,
    #[serde(default)]
    pub slot_time: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields only the payment flow or the store may set.
pub const SERVER_OWNED_BOOKING_FIELDS: [&str; 3] = ["_id", "paid", "transactionId"];

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        let required = [
            ("treatmentName", &self.treatment_name),
            ("slotDate", &self.slot_date),
            ("slotTime", &self.slot_time),
            ("patientName", &self.patient_name),
            ("patientEmail", &self.patient_email),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BookingError::MissingField(field));
            }
        }

        Ok(())
    }

    pub fn into_document(mut self) -> Document {
        for field in SERVER_OWNED_BOOKING_FIELDS {
            self.extra.remove(field);
        }

        let mut document = self.extra;
        document.insert("treatmentName".to_string(), Value::String(self.treatment_name));
        document.insert("slotDate".to_string(), Value::String(self.slot_date));
        document.insert("slotTime".to_string(), Value::String(self.slot_time));
        document.insert("patientName".to_string(), Value::String(self.patient_name));
        document.insert("patientEmail".to_string(), Value::String(self.patient_email));
        document
    }
}

/// A duplicate submission is not an HTTP error: it comes back as
/// `success: false` together with the booking that already holds the triple.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BookingOutcome {
    Created { success: bool, result: InsertResult },
    Duplicate { success: bool, booking: Document },
}

impl BookingOutcome {
    pub fn created(result: InsertResult) -> Self {
        BookingOutcome::Created { success: true, result }
    }

    pub fn duplicate(booking: Document) -> Self {
        BookingOutcome::Duplicate { success: false, booking }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub patient_email: Option<String>,
}

/// Body of `PATCH /booking/{id}`. Everything sent is mirrored into the payment log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub paid: bool,
    pub transaction_id: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum BookingError {
    #[error("{0} is required")]
    MissingField(&'static str),
}
