use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::{Actor, Page, Paginated};

use crate::error::TherapistError;
use crate::models::{
    Availability, NewAvailabilityRow, SetAvailabilityRequest, Therapist, TherapistFilter,
    TherapistProfile, UpdateTherapistRequest,
};
use crate::services::slots::validate_window;

/// Directory reads accept `None` for anonymous callers; PostgREST then applies
/// the anon role's policies.
pub struct TherapistService {
    supabase: SupabaseClient,
}

impl TherapistService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_therapist(&self, therapist_id: Uuid, auth_token: Option<&str>) -> Result<Therapist, TherapistError> {
        debug!("Fetching therapist {}", therapist_id);

        let path = format!("/rest/v1/therapists?id=eq.{}", therapist_id);
        let rows: Vec<Therapist> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        rows.into_iter().next().ok_or(TherapistError::NotFound)
    }

    pub async fn get_availability(&self, therapist_id: Uuid, auth_token: Option<&str>) -> Result<Vec<Availability>, TherapistError> {
        let path = format!(
            "/rest/v1/therapist_availabilities?therapist_id=eq.{}&is_active=eq.true&order=day_of_week.asc,start_time.asc",
            therapist_id
        );

        Ok(self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?)
    }

    pub async fn get_profile(&self, therapist_id: Uuid, auth_token: Option<&str>) -> Result<TherapistProfile, TherapistError> {
        let therapist = self.get_therapist(therapist_id, auth_token).await?;
        let availability = self.get_availability(therapist_id, auth_token).await?;

        Ok(TherapistProfile { therapist, availability })
    }

    pub async fn list_therapists(
        &self,
        filter: &TherapistFilter,
        page: Page,
        auth_token: Option<&str>,
    ) -> Result<Paginated<Therapist>, TherapistError> {
        let mut query_parts = vec!["order=rating.desc".to_string(), page.to_query()];

        if let Some(specialization) = &filter.specialization {
            query_parts.push(format!(
                "specializations=cs.%7B{}%7D",
                urlencoding::encode(specialization)
            ));
        }
        if let Some(location) = &filter.location {
            query_parts.push(format!("location=ilike.*{}*", urlencoding::encode(location)));
        }
        if let Some(min_rating) = filter.min_rating {
            query_parts.push(format!("rating=gte.{}", min_rating));
        }
        if let Some(available) = filter.available {
            query_parts.push(format!("is_available=eq.{}", available));
        }

        let path = format!("/rest/v1/therapists?{}", query_parts.join("&"));
        let (rows, total) = self.supabase.request_with_count(&path, auth_token).await?;

        Ok(Paginated::new(rows, page, total))
    }

    fn ensure_manager(actor: &Actor, therapist_id: Uuid) -> Result<(), TherapistError> {
        if actor.is_admin() || actor.user_id() == therapist_id {
            Ok(())
        } else {
            Err(TherapistError::NotOwner)
        }
    }

    /// Therapists edit their own profile; admins edit any.
    pub async fn update_therapist(
        &self,
        actor: &Actor,
        therapist_id: Uuid,
        request: UpdateTherapistRequest,
        auth_token: &str,
    ) -> Result<Therapist, TherapistError> {
        Self::ensure_manager(actor, therapist_id)?;
        let patch = request.into_patch()?;

        let path = format!("/rest/v1/therapists?id=eq.{}", therapist_id);
        let rows: Vec<Therapist> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(Value::Object(patch)),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let therapist = rows.into_iter().next().ok_or(TherapistError::NotFound)?;
        info!("Therapist {} profile updated by {}", therapist_id, actor.user_id());
        Ok(therapist)
    }

    /// Replace the weekly template. Every window is validated before anything
    /// is written; the old windows are then deleted and the new ones inserted.
    pub async fn set_availability(
        &self,
        actor: &Actor,
        therapist_id: Uuid,
        request: SetAvailabilityRequest,
        auth_token: &str,
    ) -> Result<Vec<Availability>, TherapistError> {
        Self::ensure_manager(actor, therapist_id)?;
        for window in &request.availability {
            validate_window(window)?;
        }

        self.get_therapist(therapist_id, Some(auth_token)).await?;

        let path = format!("/rest/v1/therapist_availabilities?therapist_id=eq.{}", therapist_id);
        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;

        if request.availability.is_empty() {
            info!("Therapist {} cleared their availability", therapist_id);
            return Ok(Vec::new());
        }

        let rows: Vec<NewAvailabilityRow> = request
            .availability
            .into_iter()
            .map(|w| NewAvailabilityRow {
                therapist_id,
                day_of_week: w.day_of_week,
                start_time: w.start_time,
                end_time: w.end_time,
                is_active: w.is_active.unwrap_or(true),
            })
            .collect();

        let created: Vec<Availability> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/therapist_availabilities",
                Some(auth_token),
                Some(json!(rows)),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        info!("Therapist {} availability set to {} windows", therapist_id, created.len());
        Ok(created)
    }
}
