use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Payment not found")]
    NotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Payment already exists for this booking")]
    AlreadyExists,

    #[error("Payment already verified")]
    AlreadyVerified,

    #[error("Payment is not awaiting verification")]
    NotAwaitingVerification,

    #[error("Payment belongs to another patient")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::NotFound | PaymentError::BookingNotFound => AppError::NotFound(e.to_string()),
            PaymentError::AlreadyExists
            | PaymentError::AlreadyVerified
            | PaymentError::NotAwaitingVerification => AppError::Conflict(e.to_string()),
            PaymentError::NotOwner => AppError::Forbidden(e.to_string()),
            PaymentError::Validation(msg) => AppError::ValidationError(msg),
            PaymentError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            PaymentError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
