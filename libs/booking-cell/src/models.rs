use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use payment_cell::Payment;
use shared_models::BookingStatus;

use crate::error::BookingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub therapist_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Free-text slot label such as `10:00`.
    pub appointment_time: String,
    pub location: String,
    pub complaint: String,
    pub medical_history: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub has_consent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.patient_id == user_id || self.therapist_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub therapist_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub location: String,
    pub complaint: String,
    pub medical_history: Option<String>,
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        let required = [
            ("appointment_time", &self.appointment_time),
            ("location", &self.location),
            ("complaint", &self.complaint),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BookingError::Validation(format!("{} is required", field)));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub patient_id: Option<Uuid>,
    pub therapist_id: Option<Uuid>,
}

/// Result of confirming a booking: the stored booking (PAYMENT_PENDING) and the
/// payment it now waits on.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub booking: Booking,
    pub payment: Payment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StatusUpdate {
    Updated(Booking),
    Confirmed(Confirmation),
}

impl StatusUpdate {
    pub fn booking(&self) -> &Booking {
        match self {
            StatusUpdate::Updated(booking) => booking,
            StatusUpdate::Confirmed(confirmation) => &confirmation.booking,
        }
    }
}
