use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::NotFound => AppError::NotFound(e.to_string()),
            NotificationError::Database(DatabaseError::Auth(msg)) => AppError::Auth(msg),
            NotificationError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
