use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::error::NotificationError;
use crate::models::{BroadcastStatus, NewNotificationRow, NotificationBroadcast, RecipientRow};

const MAX_CLAIM_TIMEOUT_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Expands pending broadcast intents into per-user notifications.
///
/// Each intent is claimed with a conditional update to PROCESSING, so several
/// workers may poll the same table without double delivery. A claim older than
/// `claim_timeout` is treated as abandoned and can be claimed again.
pub struct BroadcastDeliveryWorker {
    supabase: SupabaseClient,
    batch_size: u32,
    poll_interval: Duration,
    claim_timeout: chrono::Duration,
}

impl BroadcastDeliveryWorker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::service(config),
            batch_size: config.notification_worker_batch_size.max(1),
            poll_interval: Duration::from_secs(config.notification_worker_interval_seconds.max(1)),
            claim_timeout: chrono::Duration::seconds(
                config
                    .notification_worker_claim_timeout_seconds
                    .clamp(1, MAX_CLAIM_TIMEOUT_SECONDS) as i64,
            ),
        }
    }

    /// PostgREST `or` filter matching intents that may be claimed: PENDING, or
    /// PROCESSING with a claim older than `cutoff`.
    fn claimable_filter(cutoff: DateTime<Utc>) -> String {
        format!(
            "or=(status.eq.PENDING,and(status.eq.PROCESSING,claimed_at.lt.{}))",
            cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    #[instrument(skip_all)]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Broadcast delivery worker started (every {:?})", self.poll_interval);

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(0) => {}
                        Ok(n) => debug!("Delivered {} broadcasts", n),
                        Err(e) => error!("Broadcast poll failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Broadcast delivery worker stopped");
    }

    /// One poll: deliver up to `batch_size` pending intents. Returns how many
    /// were delivered by this worker.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<usize, NotificationError> {
        let token = self.supabase.service_token().to_string();
        let cutoff = Utc::now() - self.claim_timeout;
        let path = format!(
            "/rest/v1/notification_broadcasts?{}&order=created_at.asc&limit={}",
            Self::claimable_filter(cutoff),
            self.batch_size
        );

        let pending: Vec<NotificationBroadcast> = self
            .supabase
            .request(Method::GET, &path, Some(&token), None)
            .await?;

        let mut delivered = 0;
        for broadcast in pending {
            match self.claim(&broadcast, cutoff, &token).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Broadcast {} already claimed", broadcast.id);
                    continue;
                }
                Err(e) => {
                    error!("Could not claim broadcast {}: {}", broadcast.id, e);
                    continue;
                }
            }

            if broadcast.status == BroadcastStatus::Processing {
                warn!("Reclaiming broadcast {} abandoned at {:?}", broadcast.id, broadcast.claimed_at);
            }

            match self.deliver(&broadcast, &token).await {
                Ok(count) => {
                    info!("Broadcast {} delivered to {} {} accounts", broadcast.id, count, broadcast.role);
                    delivered += 1;
                    self.finish(&broadcast, json!({
                        "status": BroadcastStatus::Delivered,
                        "recipient_count": count,
                        "processed_at": Utc::now(),
                    }), &token)
                    .await;
                }
                Err(e) => {
                    warn!("Broadcast {} failed: {}", broadcast.id, e);
                    self.finish(&broadcast, json!({
                        "status": BroadcastStatus::Failed,
                        "error": e.to_string(),
                        "processed_at": Utc::now(),
                    }), &token)
                    .await;
                }
            }
        }

        Ok(delivered)
    }

    async fn claim(
        &self,
        broadcast: &NotificationBroadcast,
        cutoff: DateTime<Utc>,
        token: &str,
    ) -> Result<bool, NotificationError> {
        let path = format!(
            "/rest/v1/notification_broadcasts?id=eq.{}&{}",
            broadcast.id,
            Self::claimable_filter(cutoff)
        );

        let claimed: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(token),
                Some(json!({ "status": BroadcastStatus::Processing, "claimed_at": Utc::now() })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Ok(!claimed.is_empty())
    }

    async fn deliver(&self, broadcast: &NotificationBroadcast, token: &str) -> Result<usize, NotificationError> {
        let path = format!(
            "/rest/v1/profiles?role=eq.{}&is_active=eq.true&select=id",
            broadcast.role
        );
        let recipients: Vec<RecipientRow> = self
            .supabase
            .request(Method::GET, &path, Some(token), None)
            .await?;

        if recipients.is_empty() {
            return Ok(0);
        }

        let content = broadcast.content();
        let rows: Vec<NewNotificationRow> = recipients
            .iter()
            .map(|r| NewNotificationRow { user_id: r.id, content: &content })
            .collect();

        let _: Vec<Value> = self
            .supabase
            .request(Method::POST, "/rest/v1/notifications", Some(token), Some(json!(rows)))
            .await?;

        Ok(recipients.len())
    }

    /// Record the outcome. A failed write leaves the intent PROCESSING, to be
    /// reclaimed once its claim times out.
    async fn finish(&self, broadcast: &NotificationBroadcast, body: Value, token: &str) {
        let path = format!("/rest/v1/notification_broadcasts?id=eq.{}", broadcast.id);
        let result: Result<Vec<Value>, _> = self
            .supabase
            .request(Method::PATCH, &path, Some(token), Some(body))
            .await;
        if let Err(e) = result {
            error!("Could not record outcome of broadcast {}: {}", broadcast.id, e);
        }
    }
}
