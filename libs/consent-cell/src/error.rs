use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ConsentError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Consent not found")]
    NotFound,

    #[error("Consent already exists for this booking")]
    AlreadyExists,

    #[error("Consent has already been agreed to")]
    AlreadyAgreed,

    #[error("All consent checkboxes must be agreed to proceed")]
    IncompleteAgreement,

    #[error("Consent belongs to another patient")]
    NotOwner,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<ConsentError> for AppError {
    fn from(e: ConsentError) -> Self {
        match e {
            ConsentError::BookingNotFound | ConsentError::NotFound => AppError::NotFound(e.to_string()),
            ConsentError::AlreadyExists | ConsentError::AlreadyAgreed => AppError::Conflict(e.to_string()),
            ConsentError::IncompleteAgreement => AppError::ValidationError(e.to_string()),
            ConsentError::NotOwner => AppError::Forbidden(e.to_string()),
            ConsentError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            ConsentError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
