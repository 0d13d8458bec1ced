use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::{Actor, Page, Paginated, Role};

use crate::error::NotificationError;
use crate::models::{
    BroadcastStatus, NewNotificationRow, Notification, NotificationBroadcast, NotificationContent,
};

pub struct NotificationService {
    supabase: SupabaseClient,
}

impl NotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        content: &NotificationContent,
        auth_token: &str,
    ) -> Result<Notification, NotificationError> {
        debug!("Creating notification '{}' for user {}", content.title, user_id);

        let row = NewNotificationRow { user_id, content };
        let created: Vec<Notification> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/notifications",
                Some(auth_token),
                Some(json!(row)),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        created.into_iter().next().ok_or(NotificationError::NotFound)
    }

    /// Side-channel delivery: a failure is logged and never reaches the caller.
    pub async fn notify_or_warn(&self, user_id: Uuid, content: NotificationContent, auth_token: &str) {
        if let Err(e) = self.notify(user_id, &content, auth_token).await {
            warn!("Failed to notify user {} ('{}'): {}", user_id, content.title, e);
        }
    }

    /// Records a single broadcast intent; the delivery worker expands it into
    /// one notification per active account with `role`.
    pub async fn broadcast_to_role(
        &self,
        role: Role,
        content: &NotificationContent,
        auth_token: &str,
    ) -> Result<NotificationBroadcast, NotificationError> {
        let body = json!({
            "role": role,
            "title": content.title,
            "message": content.message,
            "type": content.notification_type,
            "data": content.data,
            "status": BroadcastStatus::Pending,
        });

        let created: Vec<NotificationBroadcast> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/notification_broadcasts",
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let broadcast = created.into_iter().next().ok_or(NotificationError::NotFound)?;
        info!("Queued broadcast {} to role {}", broadcast.id, role);
        Ok(broadcast)
    }

    pub async fn broadcast_or_warn(&self, role: Role, content: NotificationContent, auth_token: &str) {
        if let Err(e) = self.broadcast_to_role(role, &content, auth_token).await {
            warn!("Failed to queue broadcast to {} ('{}'): {}", role, content.title, e);
        }
    }

    pub async fn list_for_user(
        &self,
        actor: &Actor,
        page: Page,
        unread_only: bool,
        auth_token: &str,
    ) -> Result<Paginated<Notification>, NotificationError> {
        let mut path = format!(
            "/rest/v1/notifications?user_id=eq.{}&order=created_at.desc&{}",
            actor.user_id(),
            page.to_query()
        );
        if unread_only {
            path.push_str("&is_read=eq.false");
        }

        let (rows, total) = self.supabase.request_with_count(&path, Some(auth_token)).await?;
        Ok(Paginated::new(rows, page, total))
    }

    pub async fn mark_read(
        &self,
        actor: &Actor,
        notification_id: Uuid,
        auth_token: &str,
    ) -> Result<Notification, NotificationError> {
        let path = format!(
            "/rest/v1/notifications?id=eq.{}&user_id=eq.{}",
            notification_id,
            actor.user_id()
        );

        let updated: Vec<Notification> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "is_read": true })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        updated.into_iter().next().ok_or(NotificationError::NotFound)
    }
}
