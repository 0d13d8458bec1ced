use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::{Actor, Page, Paginated};

use crate::error::PatientError;
use crate::models::{Patient, UpdatePatientRequest};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let rows: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        rows.into_iter().next().ok_or(PatientError::NotFound)
    }

    pub async fn get_own_profile(&self, actor: &Actor, auth_token: &str) -> Result<Patient, PatientError> {
        self.get_patient(actor.user_id(), auth_token).await
    }

    pub async fn update_own_profile(
        &self,
        actor: &Actor,
        request: UpdatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        let patch = request.into_patch()?;

        let path = format!("/rest/v1/patients?id=eq.{}", actor.user_id());
        let rows: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(patch)),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let patient = rows.into_iter().next().ok_or(PatientError::NotFound)?;
        info!("Patient {} updated their profile", patient.id);
        Ok(patient)
    }

    /// Newest first.
    pub async fn list_patients(&self, page: Page, auth_token: &str) -> Result<Paginated<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?order=created_at.desc&{}", page.to_query());
        let (rows, total) = self.supabase.request_with_count(&path, Some(auth_token)).await?;

        Ok(Paginated::new(rows, page, total))
    }
}
