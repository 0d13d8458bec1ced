use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use notification_cell::{NotificationContent, NotificationService, NotificationType};
use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};
use shared_models::{Actor, BookingRef, BookingStatus, Page, Paginated, Role};

use crate::error::PaymentError;
use crate::models::{Payment, PaymentMethod, PaymentStatus};

pub struct PaymentService {
    supabase: SupabaseClient,
    notifications: NotificationService,
}

impl PaymentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            notifications: NotificationService::new(config),
        }
    }

    async fn find_one(&self, filter: &str, auth_token: &str) -> Result<Option<Payment>, PaymentError> {
        let path = format!("/rest/v1/payments?{}", filter);
        let rows: Vec<Payment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn booking_ref(&self, booking_id: Uuid, auth_token: &str) -> Result<BookingRef, PaymentError> {
        let path = format!("/rest/v1/bookings?id=eq.{}&{}", booking_id, BookingRef::SELECT);
        let rows: Vec<BookingRef> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;
        rows.into_iter().next().ok_or(PaymentError::BookingNotFound)
    }

    /// Conditional update: `guard` is an extra PostgREST filter the row must
    /// still satisfy. `None` means another writer got there first.
    async fn guarded_update(
        &self,
        payment_id: Uuid,
        guard: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Option<Payment>, PaymentError> {
        let path = format!("/rest/v1/payments?id=eq.{}&{}", payment_id, guard);
        let rows: Vec<Payment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Create the booking's PENDING payment. The amount is fixed here and never
    /// recomputed.
    pub async fn open_for_booking(
        &self,
        booking_id: Uuid,
        amount: i64,
        auth_token: &str,
    ) -> Result<Payment, PaymentError> {
        debug!("Opening payment of {} for booking {}", amount, booking_id);

        let body = json!({
            "booking_id": booking_id,
            "amount": amount,
            "method": PaymentMethod::BankTransfer,
            "status": PaymentStatus::Pending,
        });

        let created: Vec<Payment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/payments",
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => PaymentError::AlreadyExists,
                other => PaymentError::Database(other),
            })?;

        let payment = created.into_iter().next().ok_or(PaymentError::NotFound)?;
        info!("Payment {} opened for booking {}", payment.id, booking_id);
        Ok(payment)
    }

    /// Remove a payment opened by a confirmation that could not complete.
    pub async fn discard(&self, payment_id: Uuid, auth_token: &str) -> Result<(), PaymentError> {
        let path = format!("/rest/v1/payments?id=eq.{}", payment_id);
        let _: Vec<Value> = self
            .supabase
            .request(Method::DELETE, &path, Some(auth_token), None)
            .await?;
        Ok(())
    }

    pub async fn get_by_booking(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Payment, PaymentError> {
        let booking = self.booking_ref(booking_id, auth_token).await?;
        if !actor.is_admin() && !booking.is_participant(actor.user_id()) {
            return Err(PaymentError::NotOwner);
        }

        self.find_one(&format!("booking_id=eq.{}", booking_id), auth_token)
            .await?
            .ok_or(PaymentError::NotFound)
    }

    /// Patient submits transfer evidence. Allowed again after a rejection.
    pub async fn upload_proof(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        method: PaymentMethod,
        payment_proof: &str,
        auth_token: &str,
    ) -> Result<Payment, PaymentError> {
        let payment = self
            .find_one(&format!("booking_id=eq.{}", booking_id), auth_token)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if payment.status == PaymentStatus::Verified {
            return Err(PaymentError::AlreadyVerified);
        }

        let booking = self.booking_ref(booking_id, auth_token).await?;
        if booking.patient_id != actor.user_id() {
            return Err(PaymentError::NotOwner);
        }

        let body = json!({
            "payment_proof": payment_proof,
            "method": method,
            "status": PaymentStatus::Paid,
            "updated_at": Utc::now(),
        });

        let updated = self
            .guarded_update(payment.id, "status=neq.VERIFIED", body, auth_token)
            .await?
            .ok_or(PaymentError::AlreadyVerified)?;

        info!("Payment proof uploaded for booking {}", booking_id);

        let content = NotificationContent::new(
            NotificationType::Payment,
            "Payment Proof Uploaded",
            format!("Payment proof uploaded for booking {}", booking_id),
        )
        .with_data(json!({ "booking_id": booking_id, "payment_id": updated.id }));
        self.notifications
            .broadcast_or_warn(Role::Admin, content, auth_token)
            .await;

        Ok(updated)
    }

    /// One-way: a VERIFIED payment can be neither verified nor rejected again.
    /// Cascades the booking to PAID; if that write fails the payment is put
    /// back to its previous status and the error surfaces.
    pub async fn verify(
        &self,
        actor: &Actor,
        payment_id: Uuid,
        notes: Option<&str>,
        auth_token: &str,
    ) -> Result<Payment, PaymentError> {
        let payment = self
            .find_one(&format!("id=eq.{}", payment_id), auth_token)
            .await?
            .ok_or(PaymentError::NotFound)?;

        if payment.status == PaymentStatus::Verified {
            return Err(PaymentError::AlreadyVerified);
        }

        let now = Utc::now();
        let body = json!({
            "status": PaymentStatus::Verified,
            "verified_at": now,
            "verified_by": actor.user_id(),
            "notes": notes,
            "updated_at": now,
        });

        let verified = self
            .guarded_update(payment_id, "status=neq.VERIFIED", body, auth_token)
            .await?
            .ok_or(PaymentError::AlreadyVerified)?;

        let booking = match self.mark_booking_paid(verified.booking_id, auth_token).await {
            Ok(booking) => booking,
            Err(e) => {
                error!("Booking cascade for payment {} failed: {}", payment_id, e);
                self.revert_verification(&payment, auth_token).await;
                return Err(e);
            }
        };

        info!("Payment {} verified by {}; booking {} is PAID", payment_id, actor.user_id(), booking.id);

        let content = NotificationContent::new(
            NotificationType::Payment,
            "Payment Verified",
            "Your payment has been verified successfully",
        )
        .with_data(json!({ "booking_id": booking.id, "payment_id": payment_id }));
        self.notifications
            .notify_or_warn(booking.patient_id, content, auth_token)
            .await;

        Ok(verified)
    }

    async fn mark_booking_paid(&self, booking_id: Uuid, auth_token: &str) -> Result<BookingRef, PaymentError> {
        let path = format!("/rest/v1/bookings?id=eq.{}&{}", booking_id, BookingRef::SELECT);
        let bookings: Vec<BookingRef> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": BookingStatus::Paid, "updated_at": Utc::now() })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;
        bookings.into_iter().next().ok_or(PaymentError::BookingNotFound)
    }

    /// Put a payment whose booking cascade failed back to its pre-verification
    /// state so the admin can verify it again.
    async fn revert_verification(&self, previous: &Payment, auth_token: &str) {
        let body = json!({
            "status": previous.status,
            "verified_at": previous.verified_at,
            "verified_by": previous.verified_by,
            "notes": previous.notes,
            "updated_at": Utc::now(),
        });

        match self
            .guarded_update(previous.id, "status=eq.VERIFIED", body, auth_token)
            .await
        {
            Ok(Some(_)) => warn!("Payment {} reverted to {:?}", previous.id, previous.status),
            Ok(None) => warn!("Payment {} changed before it could be reverted", previous.id),
            Err(e) => error!("Could not revert payment {}: {}", previous.id, e),
        }
    }

    /// Only a submitted proof (PAID) can be rejected. The booking keeps its
    /// status so the patient can upload again against the same payment.
    pub async fn reject(
        &self,
        actor: &Actor,
        payment_id: Uuid,
        notes: &str,
        auth_token: &str,
    ) -> Result<Payment, PaymentError> {
        let payment = self
            .find_one(&format!("id=eq.{}", payment_id), auth_token)
            .await?
            .ok_or(PaymentError::NotFound)?;

        match payment.status {
            PaymentStatus::Verified => return Err(PaymentError::AlreadyVerified),
            PaymentStatus::Paid => {}
            PaymentStatus::Pending | PaymentStatus::Failed => {
                return Err(PaymentError::NotAwaitingVerification)
            }
        }

        let now = Utc::now();
        let body = json!({
            "status": PaymentStatus::Failed,
            "verified_at": now,
            "verified_by": actor.user_id(),
            "notes": notes,
            "updated_at": now,
        });

        let rejected = self
            .guarded_update(payment_id, "status=eq.PAID", body, auth_token)
            .await?
            .ok_or(PaymentError::NotAwaitingVerification)?;

        info!("Payment {} rejected by {}", payment_id, actor.user_id());

        let booking = self.booking_ref(rejected.booking_id, auth_token).await?;
        let content = NotificationContent::new(
            NotificationType::Payment,
            "Payment Rejected",
            format!("Your payment has been rejected. Reason: {}", notes),
        )
        .with_data(json!({ "booking_id": booking.id, "payment_id": payment_id }));
        self.notifications
            .notify_or_warn(booking.patient_id, content, auth_token)
            .await;

        Ok(rejected)
    }

    /// Payments with submitted proof awaiting review, newest first.
    pub async fn pending_payments(&self, page: Page, auth_token: &str) -> Result<Paginated<Payment>, PaymentError> {
        let path = format!(
            "/rest/v1/payments?status=eq.PAID&order=created_at.desc&{}",
            page.to_query()
        );
        let (rows, total) = self.supabase.request_with_count(&path, Some(auth_token)).await?;
        Ok(Paginated::new(rows, page, total))
    }
}
