use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::{Actor, BookingRef, Role};

use crate::error::ConsentError;
use crate::models::{AgreementAudit, Consent, ConsentCheckbox, ConsentFlags, ConsentText};
use crate::text::{CHECKBOX_LABELS, CONSENT_TEXT, CONSENT_VERSION};

pub struct ConsentService {
    supabase: SupabaseClient,
}

impl ConsentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn current_text() -> ConsentText {
        ConsentText {
            version: CONSENT_VERSION,
            text: CONSENT_TEXT,
            checkboxes: CHECKBOX_LABELS
                .iter()
                .map(|&(field, label)| ConsentCheckbox { field, label })
                .collect(),
        }
    }

    async fn find_by_booking(&self, booking_id: Uuid, auth_token: &str) -> Result<Option<Consent>, ConsentError> {
        let path = format!("/rest/v1/consents?booking_id=eq.{}", booking_id);
        let rows: Vec<Consent> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_id(&self, consent_id: Uuid, auth_token: &str) -> Result<Consent, ConsentError> {
        let path = format!("/rest/v1/consents?id=eq.{}", consent_id);
        let rows: Vec<Consent> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        rows.into_iter().next().ok_or(ConsentError::NotFound)
    }

    async fn booking_ref(&self, booking_id: Uuid, auth_token: &str) -> Result<BookingRef, ConsentError> {
        let path = format!("/rest/v1/bookings?id=eq.{}&{}", booking_id, BookingRef::SELECT);
        let bookings: Vec<BookingRef> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        bookings.into_iter().next().ok_or(ConsentError::BookingNotFound)
    }

    /// Set `has_consent` on the booking if it is still false. Returns whether
    /// the flag changed.
    async fn flag_booking(&self, booking_id: Uuid, auth_token: &str) -> Result<bool, ConsentError> {
        let path = format!("/rest/v1/bookings?id=eq.{}&has_consent=eq.false&select=id", booking_id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "has_consent": true, "updated_at": Utc::now() })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Open the consent step for a booking, snapshotting the published text.
    pub async fn create_consent(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Consent, ConsentError> {
        debug!("Creating consent for booking {}", booking_id);

        if self.find_by_booking(booking_id, auth_token).await?.is_some() {
            return Err(ConsentError::AlreadyExists);
        }

        let booking = self.booking_ref(booking_id, auth_token).await?;

        if booking.patient_id != actor.user_id() {
            return Err(ConsentError::NotOwner);
        }

        let body = json!({
            "booking_id": booking_id,
            "patient_id": actor.user_id(),
            "consent_version": CONSENT_VERSION,
            "consent_text": CONSENT_TEXT,
        });

        // The unique index on booking_id settles concurrent creates.
        let created: Vec<Consent> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/consents",
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => ConsentError::AlreadyExists,
                other => ConsentError::Database(other),
            })?;

        let consent = created.into_iter().next().ok_or(ConsentError::NotFound)?;
        info!("Consent {} created for booking {}", consent.id, booking_id);
        Ok(consent)
    }

    /// Finalize a consent. All five flags must be set in this one call; the
    /// update only matches a row that is still unagreed, so of two concurrent
    /// callers exactly one succeeds. Agreeing again is refused once the
    /// booking carries `has_consent`.
    pub async fn agree(
        &self,
        actor: &Actor,
        consent_id: Uuid,
        flags: &ConsentFlags,
        audit: &AgreementAudit,
        auth_token: &str,
    ) -> Result<Consent, ConsentError> {
        if !flags.all_agreed() {
            return Err(ConsentError::IncompleteAgreement);
        }

        let consent = self.find_by_id(consent_id, auth_token).await?;

        if consent.patient_id != actor.user_id() {
            return Err(ConsentError::NotOwner);
        }
        if consent.is_agreed {
            // Agreed but the booking was never flagged: finish that write.
            if self.flag_booking(consent.booking_id, auth_token).await? {
                warn!("Consent {} was agreed without flagging booking {}; repaired", consent.id, consent.booking_id);
                return Ok(consent);
            }
            return Err(ConsentError::AlreadyAgreed);
        }

        let path = format!("/rest/v1/consents?id=eq.{}&is_agreed=eq.false", consent_id);
        let body = json!({
            "agree_examination": true,
            "agree_procedure": true,
            "agree_risks": true,
            "agree_data_usage": true,
            "agree_emergency": true,
            "is_agreed": true,
            "agreed_at": Utc::now(),
            "ip_address": audit.ip_address,
            "device_info": audit.device_info,
            "updated_at": Utc::now(),
        });

        let updated: Vec<Consent> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let agreed = updated.into_iter().next().ok_or(ConsentError::AlreadyAgreed)?;

        self.flag_booking(agreed.booking_id, auth_token).await?;

        info!("Consent {} agreed for booking {}", agreed.id, agreed.booking_id);
        Ok(agreed)
    }

    /// True iff the booking has a consent and it is agreed.
    pub async fn validate_for_booking(&self, booking_id: Uuid, auth_token: &str) -> Result<bool, ConsentError> {
        Ok(self
            .find_by_booking(booking_id, auth_token)
            .await?
            .is_some_and(|c| c.is_agreed))
    }

    pub async fn get_by_booking(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Consent, ConsentError> {
        let consent = self
            .find_by_booking(booking_id, auth_token)
            .await?
            .ok_or(ConsentError::NotFound)?;

        if !actor.is_admin() {
            let booking = self.booking_ref(booking_id, auth_token).await?;
            if !booking.is_participant(actor.user_id()) {
                return Err(ConsentError::NotOwner);
            }
        }

        Ok(consent)
    }

    /// A patient may only list their own consents.
    pub async fn list_by_patient(
        &self,
        actor: &Actor,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Consent>, ConsentError> {
        if actor.role() == Role::Patient && patient_id != actor.user_id() {
            return Err(ConsentError::NotOwner);
        }

        let path = format!(
            "/rest/v1/consents?patient_id=eq.{}&order=created_at.desc",
            patient_id
        );
        Ok(self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?)
    }
}
