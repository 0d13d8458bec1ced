use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChatError;

pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

impl SendMessageRequest {
    /// Trimmed content, rejected when empty or over [`MAX_MESSAGE_LENGTH`] characters.
    pub fn content(&self) -> Result<&str, ChatError> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ChatError::Validation("content is required".to_string()));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::Validation(format!(
                "content must be at most {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        Ok(content)
    }
}

/// Frame pushed to WebSocket subscribers of a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEvent {
    pub event: String,
    pub message: ChatMessage,
}

impl RelayEvent {
    pub fn new_message(message: ChatMessage) -> Self {
        Self {
            event: "new_message".to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed_and_bounded() {
        let request = SendMessageRequest { content: "  halo  ".to_string() };
        assert_eq!(request.content().unwrap(), "halo");

        let blank = SendMessageRequest { content: "   ".to_string() };
        assert!(matches!(blank.content(), Err(ChatError::Validation(_))));

        let long = SendMessageRequest { content: "a".repeat(MAX_MESSAGE_LENGTH + 1) };
        assert!(matches!(long.content(), Err(ChatError::Validation(_))));
    }
}
