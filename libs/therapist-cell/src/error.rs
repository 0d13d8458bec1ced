use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum TherapistError {
    #[error("Therapist not found")]
    NotFound,

    #[error("Invalid availability window: {0}")]
    InvalidWindow(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Therapists may only manage their own profile")]
    NotOwner,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<TherapistError> for AppError {
    fn from(e: TherapistError) -> Self {
        match e {
            TherapistError::NotFound => AppError::NotFound(e.to_string()),
            TherapistError::InvalidWindow(_) => AppError::Internal(e.to_string()),
            TherapistError::Validation(msg) => AppError::ValidationError(msg),
            TherapistError::NotOwner => AppError::Forbidden(e.to_string()),
            TherapistError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            TherapistError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
