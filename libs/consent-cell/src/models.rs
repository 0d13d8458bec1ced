use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consent {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub patient_id: Uuid,
    pub consent_version: String,
    pub consent_text: String,
    #[serde(flatten)]
    pub flags: ConsentFlags,
    pub is_agreed: bool,
    pub agreed_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five agreement checkboxes. Absent fields deserialize as unchecked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentFlags {
    #[serde(default)]
    pub agree_examination: bool,
    #[serde(default)]
    pub agree_procedure: bool,
    #[serde(default)]
    pub agree_risks: bool,
    #[serde(default)]
    pub agree_data_usage: bool,
    #[serde(default)]
    pub agree_emergency: bool,
}

impl ConsentFlags {
    pub const ALL_AGREED: ConsentFlags = ConsentFlags {
        agree_examination: true,
        agree_procedure: true,
        agree_risks: true,
        agree_data_usage: true,
        agree_emergency: true,
    };

    pub fn all_agreed(&self) -> bool {
        *self == Self::ALL_AGREED
    }
}

/// Where the agreement was given from. Unknown values are stored as `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgreementAudit {
    pub ip_address: String,
    pub device_info: String,
}

impl AgreementAudit {
    pub const UNKNOWN: &'static str = "unknown";

    /// First hop of `X-Forwarded-For`, and the raw `User-Agent`.
    pub fn from_headers(forwarded_for: Option<&str>, user_agent: Option<&str>) -> Self {
        let ip_address = forwarded_for
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(Self::UNKNOWN);

        let device_info = user_agent
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(Self::UNKNOWN);

        Self {
            ip_address: ip_address.to_string(),
            device_info: device_info.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateConsentRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsentText {
    pub version: &'static str,
    pub text: &'static str,
    pub checkboxes: Vec<ConsentCheckbox>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsentCheckbox {
    pub field: &'static str,
    pub label: &'static str,
}
