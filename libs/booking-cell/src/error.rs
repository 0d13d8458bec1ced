use thiserror::Error;

use consent_cell::ConsentError;
use payment_cell::PaymentError;
use shared_database::DatabaseError;
use shared_models::{error::AppError, BookingStatus};
use therapist_cell::TherapistError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Therapist not found")]
    TherapistNotFound,

    #[error("Therapist is not available")]
    TherapistUnavailable,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Consent must be agreed before the booking can be confirmed")]
    ConsentRequired,

    #[error("Booking already has a payment")]
    PaymentAlreadyOpen,

    #[error("Not a participant of this booking")]
    NotParticipant,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Therapist(TherapistError),

    #[error(transparent)]
    Payment(PaymentError),

    #[error(transparent)]
    Consent(ConsentError),
}

impl From<TherapistError> for BookingError {
    fn from(e: TherapistError) -> Self {
        match e {
            TherapistError::NotFound => BookingError::TherapistNotFound,
            other => BookingError::Therapist(other),
        }
    }
}

impl From<PaymentError> for BookingError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::AlreadyExists => BookingError::PaymentAlreadyOpen,
            other => BookingError::Payment(other),
        }
    }
}

impl From<ConsentError> for BookingError {
    fn from(e: ConsentError) -> Self {
        BookingError::Consent(e)
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::NotFound | BookingError::TherapistNotFound => AppError::NotFound(e.to_string()),
            BookingError::TherapistUnavailable => AppError::Unavailable(e.to_string()),
            BookingError::InvalidTransition { .. }
            | BookingError::ConsentRequired
            | BookingError::PaymentAlreadyOpen => AppError::Conflict(e.to_string()),
            BookingError::NotParticipant => AppError::Forbidden(e.to_string()),
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            BookingError::Database(db) => AppError::Database(db.to_string()),
            BookingError::Therapist(inner) => inner.into(),
            BookingError::Payment(inner) => inner.into(),
            BookingError::Consent(inner) => inner.into(),
        }
    }
}
