use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::{Actor, BookingRef, Page, Paginated};

use crate::error::ChatError;
use crate::models::ChatMessage;
use crate::services::relay::ChatRelay;

pub struct ChatService {
    supabase: SupabaseClient,
    relay: ChatRelay,
}

impl ChatService {
    pub fn new(config: &AppConfig, relay: ChatRelay) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            relay,
        }
    }

    /// Booking participants and admins may read and write a booking's chat.
    pub async fn authorize_booking(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<BookingRef, ChatError> {
        let path = format!("/rest/v1/bookings?id=eq.{}&{}", booking_id, BookingRef::SELECT);
        let rows: Vec<BookingRef> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        let booking = rows.into_iter().next().ok_or(ChatError::BookingNotFound)?;

        if actor.is_admin() || booking.is_participant(actor.user_id()) {
            Ok(booking)
        } else {
            Err(ChatError::NotParticipant)
        }
    }

    pub async fn send(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        content: &str,
        auth_token: &str,
    ) -> Result<ChatMessage, ChatError> {
        self.authorize_booking(actor, booking_id, auth_token).await?;
        self.persist_and_publish(actor, booking_id, content, auth_token).await
    }

    /// Write then relay, for callers that already passed [`authorize_booking`](Self::authorize_booking).
    /// A relay failure does not fail the write.
    pub async fn persist_and_publish(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        content: &str,
        auth_token: &str,
    ) -> Result<ChatMessage, ChatError> {
        let created: Vec<ChatMessage> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/messages",
                Some(auth_token),
                Some(json!({
                    "booking_id": booking_id,
                    "sender_id": actor.user_id(),
                    "content": content,
                })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        let message = created.into_iter().next().ok_or(ChatError::BookingNotFound)?;
        debug!("Message {} stored for booking {}", message.id, booking_id);

        if let Err(e) = self.relay.publish(&message).await {
            warn!("Could not relay message {}: {}", message.id, e);
        }

        Ok(message)
    }

    /// Oldest first.
    pub async fn history(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        page: Page,
        auth_token: &str,
    ) -> Result<Paginated<ChatMessage>, ChatError> {
        self.authorize_booking(actor, booking_id, auth_token).await?;

        let path = format!(
            "/rest/v1/messages?booking_id=eq.{}&order=created_at.asc&{}",
            booking_id,
            page.to_query()
        );
        let (rows, total) = self.supabase.request_with_count(&path, Some(auth_token)).await?;
        info!("Fetched {} of {} messages for booking {}", rows.len(), total, booking_id);

        Ok(Paginated::new(rows, page, total))
    }
}
