use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use consent_cell::ConsentService;
use notification_cell::{NotificationContent, NotificationService, NotificationType};
use payment_cell::PaymentService;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::{Actor, BookingStatus, Page, Paginated, Role};
use therapist_cell::TherapistService;

use crate::error::BookingError;
use crate::models::{Booking, BookingListQuery, Confirmation, CreateBookingRequest, StatusUpdate};
use crate::services::lifecycle::BookingLifecycle;

pub struct BookingService {
    supabase: SupabaseClient,
    lifecycle: BookingLifecycle,
    require_consent: bool,
    therapists: TherapistService,
    consents: ConsentService,
    payments: PaymentService,
    notifications: NotificationService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            lifecycle: BookingLifecycle::new(config.booking_transition_policy),
            require_consent: config.require_consent_for_confirmation,
            therapists: TherapistService::new(config),
            consents: ConsentService::new(config),
            payments: PaymentService::new(config),
            notifications: NotificationService::new(config),
        }
    }

    async fn fetch(&self, booking_id: Uuid, auth_token: &str) -> Result<Booking, BookingError> {
        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let rows: Vec<Booking> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        rows.into_iter().next().ok_or(BookingError::NotFound)
    }

    /// Admins may act on any booking; everyone else only on their own.
    fn ensure_participant(actor: &Actor, booking: &Booking) -> Result<(), BookingError> {
        if actor.is_admin() || booking.is_participant(actor.user_id()) {
            Ok(())
        } else {
            Err(BookingError::NotParticipant)
        }
    }

    async fn write_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let rows: Vec<Booking> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": status, "updated_at": Utc::now() })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        rows.into_iter().next().ok_or(BookingError::NotFound)
    }

    /// New booking at PENDING. Neither the therapist's weekly template nor
    /// overlapping bookings are checked.
    pub async fn create(
        &self,
        actor: &Actor,
        request: &CreateBookingRequest,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        let therapist = self
            .therapists
            .get_therapist(request.therapist_id, Some(auth_token))
            .await?;

        if !therapist.is_available {
            return Err(BookingError::TherapistUnavailable);
        }

        let body = json!({
            "patient_id": actor.user_id(),
            "therapist_id": request.therapist_id,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time.trim(),
            "location": request.location.trim(),
            "complaint": request.complaint.trim(),
            "medical_history": request.medical_history,
            "notes": request.notes,
            "status": BookingStatus::Pending,
            "has_consent": false,
        });

        let created: Vec<Booking> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/bookings",
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        let booking = created.into_iter().next().ok_or(BookingError::NotFound)?;

        info!("Booking {} created for therapist {}", booking.id, booking.therapist_id);

        let content = NotificationContent::new(
            NotificationType::Booking,
            "New Booking Request",
            format!(
                "You have a new booking request on {} at {}",
                booking.appointment_date, booking.appointment_time
            ),
        )
        .with_data(json!({ "booking_id": booking.id }));
        self.notifications
            .notify_or_warn(booking.therapist_id, content, auth_token)
            .await;

        Ok(booking)
    }

    pub async fn get_by_id(&self, actor: &Actor, booking_id: Uuid, auth_token: &str) -> Result<Booking, BookingError> {
        let booking = self.fetch(booking_id, auth_token).await?;
        Self::ensure_participant(actor, &booking)?;
        Ok(booking)
    }

    async fn list_where(
        &self,
        column: &str,
        id: Uuid,
        page: Page,
        auth_token: &str,
    ) -> Result<Paginated<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?{}=eq.{}&order=created_at.desc&{}",
            column,
            id,
            page.to_query()
        );
        let (rows, total) = self.supabase.request_with_count(&path, Some(auth_token)).await?;
        Ok(Paginated::new(rows, page, total))
    }

    pub async fn list_by_patient(&self, patient_id: Uuid, page: Page, auth_token: &str) -> Result<Paginated<Booking>, BookingError> {
        self.list_where("patient_id", patient_id, page, auth_token).await
    }

    pub async fn list_by_therapist(&self, therapist_id: Uuid, page: Page, auth_token: &str) -> Result<Paginated<Booking>, BookingError> {
        self.list_where("therapist_id", therapist_id, page, auth_token).await
    }

    /// Patients list their own bookings, therapists the bookings assigned to
    /// them. Admins must name a patient or therapist.
    pub async fn list_mine(
        &self,
        actor: &Actor,
        query: &BookingListQuery,
        auth_token: &str,
    ) -> Result<Paginated<Booking>, BookingError> {
        let page = Page::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));

        match actor.role() {
            Role::Patient => self.list_by_patient(actor.user_id(), page, auth_token).await,
            Role::Therapist => self.list_by_therapist(actor.user_id(), page, auth_token).await,
            Role::Admin => match (query.patient_id, query.therapist_id) {
                (Some(patient_id), _) => self.list_by_patient(patient_id, page, auth_token).await,
                (None, Some(therapist_id)) => self.list_by_therapist(therapist_id, page, auth_token).await,
                (None, None) => Err(BookingError::Validation(
                    "patient_id or therapist_id is required".to_string(),
                )),
            },
        }
    }

    /// Generic status write. A request for CONFIRMED is routed to
    /// [`confirm_and_request_payment`](Self::confirm_and_request_payment), so the
    /// stored result is PAYMENT_PENDING.
    pub async fn update_status(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        new_status: BookingStatus,
        auth_token: &str,
    ) -> Result<StatusUpdate, BookingError> {
        if new_status == BookingStatus::Confirmed {
            return self
                .confirm_and_request_payment(actor, booking_id, auth_token)
                .await
                .map(StatusUpdate::Confirmed);
        }

        let booking = self.fetch(booking_id, auth_token).await?;
        Self::ensure_participant(actor, &booking)?;
        self.lifecycle.validate_transition(booking.status, new_status)?;

        let updated = self.write_status(booking_id, new_status, auth_token).await?;
        info!("Booking {} status {} -> {}", booking_id, booking.status, new_status);

        self.notify_status(&updated, new_status, auth_token).await;
        Ok(StatusUpdate::Updated(updated))
    }

    /// Confirm a booking and open its payment in one logical step:
    ///
    /// 1. the PENDING payment is created at the therapist's current price;
    /// 2. the booking is stored as PAYMENT_PENDING (CONFIRMED is never written).
    ///
    /// If step 2 fails the payment from step 1 is deleted again.
    pub async fn confirm_and_request_payment(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Confirmation, BookingError> {
        let booking = self.fetch(booking_id, auth_token).await?;
        Self::ensure_participant(actor, &booking)?;
        self.lifecycle
            .validate_transition(booking.status, BookingStatus::Confirmed)?;

        if self.require_consent
            && !self.consents.validate_for_booking(booking_id, auth_token).await?
        {
            return Err(BookingError::ConsentRequired);
        }

        let therapist = self
            .therapists
            .get_therapist(booking.therapist_id, Some(auth_token))
            .await?;

        let payment = self
            .payments
            .open_for_booking(booking_id, therapist.price_per_session, auth_token)
            .await?;

        let stored = match self
            .write_status(booking_id, BookingStatus::PaymentPending, auth_token)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                error!("Confirming booking {} failed after opening payment {}: {}", booking_id, payment.id, e);
                if let Err(undo) = self.payments.discard(payment.id, auth_token).await {
                    warn!("Could not discard payment {}: {}", payment.id, undo);
                }
                return Err(e);
            }
        };

        info!(
            "Booking {} confirmed; payment {} of {} requested",
            booking_id, payment.id, payment.amount
        );

        self.notify_status(&stored, BookingStatus::Confirmed, auth_token).await;
        Ok(Confirmation { booking: stored, payment })
    }

    /// Sets CANCELLED whatever the current status, unless the strict policy is on.
    pub async fn cancel(&self, actor: &Actor, booking_id: Uuid, auth_token: &str) -> Result<Booking, BookingError> {
        let booking = self.fetch(booking_id, auth_token).await?;
        Self::ensure_participant(actor, &booking)?;
        self.lifecycle
            .validate_transition(booking.status, BookingStatus::Cancelled)?;

        let cancelled = self
            .write_status(booking_id, BookingStatus::Cancelled, auth_token)
            .await?;
        info!("Booking {} cancelled by {} (was {})", booking_id, actor.user_id(), booking.status);

        Ok(cancelled)
    }

    async fn notify_status(&self, booking: &Booking, requested: BookingStatus, auth_token: &str) {
        debug!("Notifying patient {} of booking {} status", booking.patient_id, booking.id);

        let message = if requested == BookingStatus::Confirmed {
            "Your booking has been confirmed. Please complete the payment.".to_string()
        } else {
            format!("Your booking status has been updated to {}", booking.status)
        };

        let content = NotificationContent::new(NotificationType::Booking, "Booking Status Updated", message)
            .with_data(json!({ "booking_id": booking.id, "status": booking.status }));
        self.notifications
            .notify_or_warn(booking.patient_id, content, auth_token)
            .await;
    }
}
