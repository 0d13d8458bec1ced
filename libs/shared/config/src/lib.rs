use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How strictly booking status updates are checked against the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be written over any other (administrative override).
    #[default]
    Permissive,
    /// Only edges of the booking lifecycle graph are accepted.
    Strict,
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "strict" => Ok(TransitionPolicy::Strict),
            other => Err(format!("unknown transition policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub booking_transition_policy: TransitionPolicy,
    pub require_consent_for_confirmation: bool,
    pub notification_worker_interval_seconds: u64,
    pub notification_worker_batch_size: u32,
    /// A PROCESSING broadcast older than this is assumed abandoned and reclaimed.
    pub notification_worker_claim_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            supabase_jwt_secret: String::new(),
            port: 5000,
            cors_origin: None,
            booking_transition_policy: TransitionPolicy::Permissive,
            require_consent_for_confirmation: false,
            notification_worker_interval_seconds: 5,
            notification_worker_batch_size: 20,
            notification_worker_claim_timeout_seconds: 300,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: required_var("SUPABASE_URL"),
            supabase_anon_key: required_var("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_service_role_key: required_var("SUPABASE_SERVICE_ROLE_KEY"),
            supabase_jwt_secret: required_var("SUPABASE_JWT_SECRET"),
            port: parsed_var("PORT", defaults.port),
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty()),
            booking_transition_policy: parsed_var(
                "BOOKING_TRANSITION_POLICY",
                defaults.booking_transition_policy,
            ),
            require_consent_for_confirmation: parsed_var(
                "REQUIRE_CONSENT_FOR_CONFIRMATION",
                defaults.require_consent_for_confirmation,
            ),
            notification_worker_interval_seconds: parsed_var(
                "NOTIFICATION_WORKER_INTERVAL_SECONDS",
                defaults.notification_worker_interval_seconds,
            ),
            notification_worker_batch_size: parsed_var(
                "NOTIFICATION_WORKER_BATCH_SIZE",
                defaults.notification_worker_batch_size,
            ),
            notification_worker_claim_timeout_seconds: parsed_var(
                "NOTIFICATION_WORKER_CLAIM_TIMEOUT_SECONDS",
                defaults.notification_worker_claim_timeout_seconds,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// The broadcast delivery worker writes on behalf of no particular user and
    /// needs the service role key.
    pub fn is_notification_worker_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_role_key.is_empty()
    }
}

fn required_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{} has invalid value '{}' ({}), using default", name, raw, e);
            default
        }),
        Err(_) => default,
    }
}
