use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Not a participant of this booking")]
    NotParticipant,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::BookingNotFound => AppError::NotFound(e.to_string()),
            ChatError::NotParticipant => AppError::Forbidden(e.to_string()),
            ChatError::Validation(msg) => AppError::ValidationError(msg),
            ChatError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            ChatError::Database(db) => AppError::Database(db.to_string()),
            ChatError::Serialization(err) => AppError::Internal(err.to_string()),
        }
    }
}
