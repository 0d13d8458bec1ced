use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{Mock, MockServer, ResponseTemplate};

use payment_cell::payment_routes;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn post(config: &TestConfig, user: &TestUser, uri: String, body: serde_json::Value) -> StatusCode {
    let token = JwtTestUtils::create_test_token(user, &config.jwt_secret, None);

    payment_routes(config.to_arc())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn empty_rejection_notes_never_reach_the_store() {
    let mock_server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri());
    let admin = TestUser::admin("admin@example.com");

    let status = post(&config, &admin, format!("/{}/reject", Uuid::new_v4()), json!({ "notes": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let status = post(&config, &admin, format!("/{}/reject", Uuid::new_v4()), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_admins_verify() {
    let config = TestConfig::default();
    let patient = TestUser::patient("pasien@example.com");

    let status = post(&config, &patient, format!("/{}/verify", Uuid::new_v4()), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_payment_method_is_rejected() {
    let config = TestConfig::default();
    let patient = TestUser::patient("pasien@example.com");

    let status = post(
        &config,
        &patient,
        "/upload-proof".to_string(),
        json!({ "booking_id": Uuid::new_v4(), "method": "CASH", "payment_proof": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
