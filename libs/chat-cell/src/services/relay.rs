use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::ChatError;
use crate::models::{ChatMessage, RelayEvent};

pub type RelaySender = broadcast::Sender<String>;
pub type RelayReceiver = broadcast::Receiver<String>;

/// Per-booking topic buffer. Subscribers further behind than this lose messages.
pub const TOPIC_CAPACITY: usize = 64;

/// In-process pub/sub keyed by booking. Nothing is buffered for absent
/// subscribers and nothing survives a restart.
#[derive(Clone, Default)]
pub struct ChatRelay {
    topics: Arc<RwLock<HashMap<Uuid, RelaySender>>>,
}

impl ChatRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, booking_id: Uuid) -> RelayReceiver {
        let mut topics = self.topics.write().await;
        topics
            .entry(booking_id)
            .or_insert_with(|| {
                debug!("Opened chat topic for booking {}", booking_id);
                broadcast::channel(TOPIC_CAPACITY).0
            })
            .subscribe()
    }

    /// Returns how many subscribers the message reached.
    pub async fn publish(&self, message: &ChatMessage) -> Result<usize, ChatError> {
        let frame = serde_json::to_string(&RelayEvent::new_message(message.clone()))?;

        let topics = self.topics.read().await;
        let delivered = topics
            .get(&message.booking_id)
            .and_then(|sender| sender.send(frame).ok())
            .unwrap_or(0);

        debug!("Message {} relayed to {} subscriber(s)", message.id, delivered);
        Ok(delivered)
    }

    /// Drop the topic once its last subscriber has gone.
    pub async fn prune(&self, booking_id: Uuid) {
        let mut topics = self.topics.write().await;
        if topics
            .get(&booking_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            topics.remove(&booking_id);
            debug!("Closed chat topic for booking {}", booking_id);
        }
    }

    pub async fn active_topics(&self) -> Vec<Uuid> {
        self.topics.read().await.keys().copied().collect()
    }
}
