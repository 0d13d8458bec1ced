use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::PatientError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::str::FromStr for Gender {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(PatientError::Validation(format!("Invalid gender: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// Patient profile. `id` is the patient's auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Own-profile update. Dates and gender arrive as strings so malformed values
/// are reported as validation errors rather than body rejections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub profile_image: Option<String>,
}

fn required_text(field: &str, value: String) -> Result<Value, PatientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PatientError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(json!(trimmed))
}

impl UpdatePatientRequest {
    pub fn into_patch(self) -> Result<Map<String, Value>, PatientError> {
        let mut patch = Map::new();

        if let Some(name) = self.full_name {
            patch.insert("full_name".to_string(), required_text("full_name", name)?);
        }
        if let Some(phone) = self.phone {
            patch.insert("phone".to_string(), required_text("phone", phone)?);
        }
        if let Some(date) = self.date_of_birth {
            let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map_err(|_| PatientError::Validation(format!("Invalid date_of_birth: {}", date)))?;
            if parsed > Utc::now().date_naive() {
                return Err(PatientError::Validation("date_of_birth is in the future".to_string()));
            }
            patch.insert("date_of_birth".to_string(), json!(parsed));
        }
        if let Some(gender) = self.gender {
            patch.insert("gender".to_string(), json!(gender.parse::<Gender>()?));
        }
        if let Some(address) = self.address {
            patch.insert("address".to_string(), json!(address.trim()));
        }
        if let Some(history) = self.medical_history {
            patch.insert("medical_history".to_string(), json!(history));
        }
        if let Some(contact) = self.emergency_contact {
            if contact.name.trim().is_empty() || contact.phone.trim().is_empty() {
                return Err(PatientError::Validation(
                    "emergency_contact needs a name and phone".to_string(),
                ));
            }
            patch.insert("emergency_contact".to_string(), json!(contact));
        }
        if let Some(image) = self.profile_image {
            patch.insert("profile_image".to_string(), json!(image));
        }

        if patch.is_empty() {
            return Err(PatientError::Validation("no fields to update".to_string()));
        }

        patch.insert("updated_at".to_string(), json!(Utc::now()));
        Ok(patch)
    }
}
