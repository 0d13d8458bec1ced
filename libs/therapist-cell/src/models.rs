use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::TherapistError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    pub id: Uuid,
    pub full_name: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    /// Whole rupiah.
    pub price_per_session: i64,
    #[serde(default)]
    pub rating: f64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One window of the weekly template. `day_of_week` counts from Sunday = 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Availability {
    pub id: Uuid,
    pub therapist_id: Uuid,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct TherapistProfile {
    #[serde(flatten)]
    pub therapist: Therapist,
    pub availability: Vec<Availability>,
}

/// Partial profile update. `rating` is derived from reviews and cannot be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTherapistRequest {
    pub full_name: Option<String>,
    pub specializations: Option<Vec<String>>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub price_per_session: Option<i64>,
    pub is_available: Option<bool>,
}

impl UpdateTherapistRequest {
    /// Validated PATCH body containing only the supplied fields.
    pub fn into_patch(self) -> Result<serde_json::Map<String, serde_json::Value>, TherapistError> {
        let mut patch = serde_json::Map::new();

        if let Some(name) = self.full_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(TherapistError::Validation("full_name cannot be empty".to_string()));
            }
            patch.insert("full_name".to_string(), json!(name));
        }
        if let Some(specializations) = self.specializations {
            let cleaned: Vec<&str> = specializations
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect();
            patch.insert("specializations".to_string(), json!(cleaned));
        }
        if let Some(location) = self.location {
            patch.insert("location".to_string(), json!(location.trim()));
        }
        if let Some(bio) = self.bio {
            patch.insert("bio".to_string(), json!(bio));
        }
        if let Some(years) = self.experience_years {
            if years < 0 {
                return Err(TherapistError::Validation("experience_years cannot be negative".to_string()));
            }
            patch.insert("experience_years".to_string(), json!(years));
        }
        if let Some(price) = self.price_per_session {
            if price < 0 {
                return Err(TherapistError::Validation("price_per_session cannot be negative".to_string()));
            }
            patch.insert("price_per_session".to_string(), json!(price));
        }
        if let Some(available) = self.is_available {
            patch.insert("is_available".to_string(), json!(available));
        }

        if patch.is_empty() {
            return Err(TherapistError::Validation("no fields to update".to_string()));
        }

        patch.insert("updated_at".to_string(), json!(Utc::now()));
        Ok(patch)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityWindow {
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_active: Option<bool>,
}

/// Replaces the whole weekly template.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    pub availability: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAvailabilityRow {
    pub therapist_id: Uuid,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TherapistFilter {
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    pub available: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub from: Option<NaiveDate>,
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}
