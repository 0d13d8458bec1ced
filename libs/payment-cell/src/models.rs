use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PaymentError;

/// `PAID` means proof has been submitted and is awaiting admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Verified,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Qris,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    /// Whole rupiah, fixed when the booking was confirmed.
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub payment_proof: Option<String>,
    /// Set by both verification and rejection.
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UploadProofRequest {
    pub booking_id: Uuid,
    pub method: PaymentMethod,
    pub payment_proof: String,
}

impl UploadProofRequest {
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.payment_proof.trim().is_empty() {
            return Err(PaymentError::Validation("Payment proof is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectPaymentRequest {
    #[serde(default)]
    pub notes: String,
}

impl RejectPaymentRequest {
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.notes.trim().is_empty() {
            return Err(PaymentError::Validation("Rejection notes are required".to_string()));
        }
        Ok(())
    }
}
