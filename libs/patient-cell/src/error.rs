use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum PatientError {
    #[error("Patient profile not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::Validation(msg) => AppError::ValidationError(msg),
            PatientError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            PatientError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
