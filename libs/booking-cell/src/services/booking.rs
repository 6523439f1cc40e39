use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_database::{Collection, Document, DocumentStore, Filter};

use crate::models::{BookingOutcome, CompletePaymentRequest, CreateBookingRequest, PaymentUpdate};

pub struct BookingService {
    store: Arc<dyn DocumentStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn bookings_for_patient(&self, patient_email: &str) -> Result<Vec<Document>> {
        debug!("Fetching bookings for {}", patient_email);
        self.store
            .find(Collection::Bookings, &Filter::new().eq("patientEmail", patient_email))
            .await
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Option<Document>> {
        self.store
            .find_one(Collection::Bookings, &Filter::by_id(booking_id))
            .await
    }

    /// Inserts the booking unless one already exists for the same treatment,
    /// date and patient name.
    ///
    /// The check and the insert are two separate store calls, so two
    /// concurrent submissions of the same triple can both succeed.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<BookingOutcome> {
        let uniqueness = Filter::new()
            .eq("treatmentName", request.treatment_name.as_str())
            .eq("slotDate", request.slot_date.as_str())
            .eq("patientName", request.patient_name.as_str());

        if let Some(existing) = self.store.find_one(Collection::Bookings, &uniqueness).await? {
            info!(
                "Duplicate booking for {} on {} by {}",
                request.treatment_name, request.slot_date, request.patient_name
            );
            return Ok(BookingOutcome::duplicate(existing));
        }

        let result = self
            .store
            .insert_one(Collection::Bookings, request.into_document())
            .await?;

        info!("Booking {} created", result.inserted_id);
        Ok(BookingOutcome::created(result))
    }

    /// Logs the payment and marks the booking paid. The two writes are
    /// independent; a failed booking update leaves the payment record in place.
    ///
    /// Returns `None` without writing anything when the booking does not exist.
    /// A booking that is already paid keeps its first payment: later calls
    /// write nothing and return the stored transaction.
    pub async fn complete_payment(
        &self,
        booking_id: &str,
        payment: CompletePaymentRequest,
    ) -> Result<Option<PaymentUpdate>> {
        let Some(booking) = self.get_booking(booking_id).await? else {
            warn!("Payment submitted for unknown booking {}", booking_id);
            return Ok(None);
        };

        if booking.get("paid") == Some(&Value::Bool(true)) {
            let recorded = booking
                .get("transactionId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if recorded != payment.transaction_id {
                warn!(
                    "Ignoring payment {} for booking {} already paid by {}",
                    payment.transaction_id, booking_id, recorded
                );
            } else {
                debug!("Payment {} already recorded for booking {}", recorded, booking_id);
            }
            return Ok(Some(PaymentUpdate {
                paid: true,
                transaction_id: recorded,
            }));
        }

        let update = PaymentUpdate {
            paid: true,
            transaction_id: payment.transaction_id.clone(),
        };

        let mut record = payment.extra;
        record.remove("_id");
        record.insert("transactionId".to_string(), json!(payment.transaction_id));
        record.insert("bookingId".to_string(), json!(booking_id));

        let inserted = self.store.insert_one(Collection::Payments, record).await?;
        debug!("Payment {} logged for booking {}", inserted.inserted_id, booking_id);

        let mut set = Document::new();
        set.insert("paid".to_string(), json!(update.paid));
        set.insert("transactionId".to_string(), json!(update.transaction_id));

        self.store
            .update_one(Collection::Bookings, &Filter::by_id(booking_id), set, false)
            .await?;

        info!("Booking {} marked paid ({})", booking_id, update.transaction_id);
        Ok(Some(update))
    }
}
