use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Booking,
    Payment,
    Consent,
    Chat,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub data: Option<Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload of a single notification, before it has a recipient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationContent {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub data: Option<Value>,
}

impl NotificationContent {
    pub fn new(notification_type: NotificationType, title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            notification_type,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewNotificationRow<'a> {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub content: &'a NotificationContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BroadcastStatus {
    Pending,
    Processing,
    Delivered,
    Failed,
}

/// Intent to notify every active account holding `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationBroadcast {
    pub id: Uuid,
    pub role: Role,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub data: Option<Value>,
    pub status: BroadcastStatus,
    pub recipient_count: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub claimed_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl NotificationBroadcast {
    pub fn content(&self) -> NotificationContent {
        NotificationContent {
            title: self.title.clone(),
            message: self.message.clone(),
            notification_type: self.notification_type,
            data: self.data.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecipientRow {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}
