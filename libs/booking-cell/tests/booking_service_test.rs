use assert_matches::assert_matches;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::{BookingError, BookingListQuery, BookingService, CreateBookingRequest, StatusUpdate};
use shared_config::{AppConfig, TransitionPolicy};
use shared_models::{Actor, BookingStatus, Role};
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig, TestUser};

struct Fixture {
    server: MockServer,
    patient: TestUser,
    therapist: TestUser,
    admin: TestUser,
    booking_id: String,
}

impl Fixture {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            patient: TestUser::patient("pasien@example.com"),
            therapist: TestUser::therapist("terapis@example.com"),
            admin: TestUser::admin("admin@example.com"),
            booking_id: Uuid::new_v4().to_string(),
        }
    }

    fn config(&self) -> AppConfig {
        TestConfig::with_url(&self.server.uri()).to_app_config()
    }

    fn service(&self) -> BookingService {
        BookingService::new(&self.config())
    }

    fn actor(user: &TestUser) -> Actor {
        Actor::any(&user.to_user()).unwrap()
    }

    fn booking_uuid(&self) -> Uuid {
        Uuid::parse_str(&self.booking_id).unwrap()
    }

    fn booking(&self, status: &str) -> Value {
        MockSupabaseResponses::booking_response(&self.booking_id, &self.patient.id, &self.therapist.id, status)
    }

    async fn mount_booking(&self, status: &str) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/bookings"))
            .and(query_param("id", format!("eq.{}", self.booking_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([self.booking(status)])))
            .mount(&self.server)
            .await;
    }

    async fn mount_therapist(&self, price: i64, available: bool) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/therapists"))
            .and(query_param("id", format!("eq.{}", self.therapist.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockSupabaseResponses::therapist_response(&self.therapist.id, price, available)
            ])))
            .mount(&self.server)
            .await;
    }

    async fn mount_status_write(&self, status: &str) {
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/bookings"))
            .and(query_param("id", format!("eq.{}", self.booking_id)))
            .and(body_partial_json(json!({ "status": status })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([self.booking(status)])))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    async fn mount_notifications(&self) {
        Mock::given(method("POST"))
            .and(path("/rest/v1/notifications"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                MockSupabaseResponses::notification_response(&self.patient.id, "Booking Status Updated")
            ])))
            .mount(&self.server)
            .await;
    }

    fn create_request(&self) -> CreateBookingRequest {
        serde_json::from_value(json!({
            "therapist_id": self.therapist.id,
            "appointment_date": "2024-12-25",
            "appointment_time": "10:00",
            "location": "Jl. Melati No. 5, Jakarta",
            "complaint": "Nyeri punggung bawah"
        }))
        .unwrap()
    }
}

#[tokio::test]
async fn create_against_unavailable_therapist_writes_nothing() {
    let f = Fixture::new().await;
    f.mount_therapist(250000, false).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let result = f
        .service()
        .create(&Fixture::actor(&f.patient), &f.create_request(), "token")
        .await;
    assert_matches!(result, Err(BookingError::TherapistUnavailable));
}

#[tokio::test]
async fn create_for_unknown_therapist_is_not_found() {
    let f = Fixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&f.server)
        .await;

    let result = f
        .service()
        .create(&Fixture::actor(&f.patient), &f.create_request(), "token")
        .await;
    assert_matches!(result, Err(BookingError::TherapistNotFound));
}

#[tokio::test]
async fn create_stores_pending_and_notifies_therapist() {
    let f = Fixture::new().await;
    f.mount_therapist(250000, true).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .and(body_partial_json(json!({
            "patient_id": f.patient.id,
            "therapist_id": f.therapist.id,
            "appointment_date": "2024-12-25",
            "status": "PENDING",
            "has_consent": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([f.booking("PENDING")])))
        .expect(1)
        .mount(&f.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({
            "user_id": f.therapist.id,
            "title": "New Booking Request",
            "type": "BOOKING"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::notification_response(&f.therapist.id, "New Booking Request")
        ])))
        .expect(1)
        .mount(&f.server)
        .await;

    let booking = f
        .service()
        .create(&Fixture::actor(&f.patient), &f.create_request(), "token")
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
}

#[tokio::test]
async fn confirming_stores_payment_pending_with_price_snapshot() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;
    f.mount_therapist(250000, true).await;
    f.mount_notifications().await;
    f.mount_status_write("PAYMENT_PENDING").await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(body_partial_json(json!({ "status": "CONFIRMED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let payment_id = Uuid::new_v4().to_string();
    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .and(body_partial_json(json!({
            "booking_id": f.booking_id,
            "amount": 250000,
            "method": "BANK_TRANSFER",
            "status": "PENDING"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::payment_response(&payment_id, &f.booking_id, "PENDING", 250000)
        ])))
        .expect(1)
        .mount(&f.server)
        .await;

    let update = f
        .service()
        .update_status(&Fixture::actor(&f.therapist), f.booking_uuid(), BookingStatus::Confirmed, "token")
        .await
        .unwrap();

    let confirmation = match update {
        StatusUpdate::Confirmed(confirmation) => confirmation,
        other => panic!("expected confirmation, got {:?}", other),
    };
    assert_eq!(confirmation.booking.status, BookingStatus::PaymentPending);
    assert_eq!(confirmation.payment.amount, 250000);
    assert_eq!(confirmation.payment.status, payment_cell::PaymentStatus::Pending);
}

#[tokio::test]
async fn failed_confirmation_write_discards_the_payment() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;
    f.mount_therapist(250000, true).await;

    let payment_id = Uuid::new_v4().to_string();
    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::payment_response(&payment_id, &f.booking_id, "PENDING", 250000)
        ])))
        .mount(&f.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&f.server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/payments"))
        .and(query_param("id", format!("eq.{}", payment_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&f.server)
        .await;

    let result = f
        .service()
        .confirm_and_request_payment(&Fixture::actor(&f.admin), f.booking_uuid(), "token")
        .await;
    assert_matches!(result, Err(BookingError::Database(_)));
}

#[tokio::test]
async fn second_confirmation_is_conflict() {
    let f = Fixture::new().await;
    f.mount_booking("PAYMENT_PENDING").await;
    f.mount_therapist(250000, true).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(
            MockSupabaseResponses::error_response("duplicate key value violates unique constraint", "23505"),
        ))
        .mount(&f.server)
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let result = f
        .service()
        .confirm_and_request_payment(&Fixture::actor(&f.therapist), f.booking_uuid(), "token")
        .await;
    assert_matches!(result, Err(BookingError::PaymentAlreadyOpen));
}

#[tokio::test]
async fn consent_gate_blocks_confirmation_when_enabled() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/consents"))
        .and(query_param("booking_id", format!("eq.{}", f.booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::consent_response(&Uuid::new_v4().to_string(), &f.booking_id, &f.patient.id, false)
        ])))
        .expect(1)
        .mount(&f.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let config = AppConfig {
        require_consent_for_confirmation: true,
        ..f.config()
    };

    let result = BookingService::new(&config)
        .confirm_and_request_payment(&Fixture::actor(&f.therapist), f.booking_uuid(), "token")
        .await;
    assert_matches!(result, Err(BookingError::ConsentRequired));
}

#[tokio::test]
async fn permissive_policy_accepts_skipping_states() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;
    f.mount_notifications().await;
    f.mount_status_write("COMPLETED").await;

    let update = f
        .service()
        .update_status(&Fixture::actor(&f.admin), f.booking_uuid(), BookingStatus::Completed, "token")
        .await
        .unwrap();
    assert_eq!(update.booking().status, BookingStatus::Completed);
}

#[tokio::test]
async fn strict_policy_rejects_skipping_states() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&f.server)
        .await;

    let config = AppConfig {
        booking_transition_policy: TransitionPolicy::Strict,
        ..f.config()
    };

    let result = BookingService::new(&config)
        .update_status(&Fixture::actor(&f.admin), f.booking_uuid(), BookingStatus::Completed, "token")
        .await;
    assert_matches!(
        result,
        Err(BookingError::InvalidTransition { from: BookingStatus::Pending, to: BookingStatus::Completed })
    );
}

#[tokio::test]
async fn status_update_notifies_patient() {
    let f = Fixture::new().await;
    f.mount_booking("PAID").await;
    f.mount_status_write("IN_PROGRESS").await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .and(body_partial_json(json!({
            "user_id": f.patient.id,
            "title": "Booking Status Updated"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::notification_response(&f.patient.id, "Booking Status Updated")
        ])))
        .expect(1)
        .mount(&f.server)
        .await;

    f.service()
        .update_status(&Fixture::actor(&f.therapist), f.booking_uuid(), BookingStatus::InProgress, "token")
        .await
        .unwrap();
}

#[tokio::test]
async fn cancelling_a_completed_booking_still_succeeds() {
    let f = Fixture::new().await;
    f.mount_booking("COMPLETED").await;
    f.mount_status_write("CANCELLED").await;

    let booking = f
        .service()
        .cancel(&Fixture::actor(&f.patient), f.booking_uuid(), "token")
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn unrelated_therapist_cannot_touch_booking() {
    let f = Fixture::new().await;
    f.mount_booking("PENDING").await;

    let stranger = TestUser::therapist("lain@example.com");
    let result = f
        .service()
        .update_status(&Fixture::actor(&stranger), f.booking_uuid(), BookingStatus::Cancelled, "token")
        .await;
    assert_matches!(result, Err(BookingError::NotParticipant));
}

#[tokio::test]
async fn missing_booking_is_not_found() {
    let f = Fixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&f.server)
        .await;

    let result = f
        .service()
        .cancel(&Fixture::actor(&f.admin), f.booking_uuid(), "token")
        .await;
    assert_matches!(result, Err(BookingError::NotFound));
}

#[tokio::test]
async fn list_mine_scopes_by_role() {
    let f = Fixture::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("therapist_id", format!("eq.{}", f.therapist.id)))
        .and(query_param("order", "created_at.desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/21")
                .set_body_json(json!([f.booking("PENDING")])),
        )
        .expect(1)
        .mount(&f.server)
        .await;

    let page = f
        .service()
        .list_mine(&Fixture::actor(&f.therapist), &BookingListQuery::default(), "token")
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 21);
    assert_eq!(page.pagination.total_pages, 3);

    let admin = Actor::authorize(&f.admin.to_user(), &[Role::Admin]).unwrap();
    let result = f.service().list_mine(&admin, &BookingListQuery::default(), "token").await;
    assert_matches!(result, Err(BookingError::Validation(_)));
}
