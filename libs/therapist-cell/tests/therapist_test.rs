use assert_matches::assert_matches;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_models::{Actor, Page};
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};
use therapist_cell::{
    therapist_routes, SetAvailabilityRequest, TherapistError, TherapistFilter, TherapistService,
    UpdateTherapistRequest,
};

fn anonymous(req: &wiremock::Request) -> bool {
    !req.headers.contains_key("authorization")
}

async fn send(config: &TestConfig, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = therapist_routes(config.to_arc()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn unknown_therapist_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());
    let result = service.get_therapist(Uuid::new_v4(), Some("token")).await;

    assert_matches!(result, Err(TherapistError::NotFound));
}

#[tokio::test]
async fn list_applies_filters_and_rating_order() {
    let mock_server = MockServer::start().await;
    let therapist_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .and(query_param("order", "rating.desc"))
        .and(query_param("rating", "gte.4.5"))
        .and(query_param("is_available", "eq.true"))
        .and(query_param("location", "ilike.*Jakarta*"))
        .and(query_param("specializations", "cs.{Sports Injury}"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([MockSupabaseResponses::therapist_response(&therapist_id, 250000, true)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());
    let filter = TherapistFilter {
        specialization: Some("Sports Injury".to_string()),
        location: Some("Jakarta".to_string()),
        min_rating: Some(4.5),
        available: Some(true),
        ..TherapistFilter::default()
    };

    let result = service.list_therapists(&filter, Page::default(), Some("token")).await.unwrap();
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0].price_per_session, 250000);
    assert_eq!(result.pagination.total_pages, 1);
}

#[tokio::test]
async fn slots_endpoint_expands_weekly_template() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let therapist_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapist_availabilities"))
        .and(query_param("therapist_id", format!("eq.{}", therapist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_response(&therapist_id, 1, "09:00", "17:00")
        ])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(&config, "GET", &format!("/{}/slots?from=2024-12-23&days=7", therapist_id), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"][0]["date"], "2024-12-23");
    assert_eq!(body["slots"][0]["slots"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn directory_reads_need_no_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let therapist_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .and(header("apikey", "test-anon-key"))
        .and(anonymous)
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([MockSupabaseResponses::therapist_response(&therapist_id, 200000, true)])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapist_availabilities"))
        .and(anonymous)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_response(&therapist_id, 2, "08:00", "12:00")
        ])))
        .mount(&mock_server)
        .await;

    let (status, body) = send(&config, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["therapists"].as_array().unwrap().len(), 1);

    let (status, body) = send(&config, "GET", &format!("/{}", therapist_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["therapist"]["availability"][0]["day_of_week"], 2);

    let (status, body) = send(&config, "GET", &format!("/{}/availability", therapist_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"][0]["start_time"], "08:00");
}

#[tokio::test]
async fn profile_writes_require_a_token() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let therapist_id = Uuid::new_v4();

    let (status, _) = send(&config, "PUT", &format!("/{}", therapist_id), None, Some(json!({ "bio": "x" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let patient = TestUser::patient("pasien@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, None);
    let (status, _) = send(
        &config,
        "POST",
        &format!("/{}/availability", therapist_id),
        Some(&token),
        Some(json!({ "availability": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn therapist_updates_own_profile() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let therapist = TestUser::therapist("terapis@example.com");
    let token = JwtTestUtils::create_test_token(&therapist, &config.jwt_secret, None);

    let mut updated = MockSupabaseResponses::therapist_response(&therapist.id, 300000, false);
    updated["bio"] = json!("Spesialis cedera olahraga");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/therapists"))
        .and(query_param("id", format!("eq.{}", therapist.id)))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "bio": "Spesialis cedera olahraga",
            "price_per_session": 300000,
            "is_available": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        &config,
        "PUT",
        &format!("/{}", therapist.id),
        Some(&token),
        Some(json!({ "bio": "Spesialis cedera olahraga", "price_per_session": 300000, "is_available": false })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["therapist"]["price_per_session"], 300000);
    assert_eq!(body["therapist"]["is_available"], false);
}

#[tokio::test]
async fn therapist_cannot_update_another_profile() {
    let mock_server = MockServer::start().await;
    let other = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());
    let actor = Actor::any(&TestUser::therapist("terapis@example.com").to_user()).unwrap();
    let request = UpdateTherapistRequest {
        bio: Some("bukan profil saya".to_string()),
        ..UpdateTherapistRequest::default()
    };

    let result = service.update_therapist(&actor, other, request, "token").await;
    assert_matches!(result, Err(TherapistError::NotOwner));
}

#[tokio::test]
async fn admin_update_of_missing_therapist_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/therapists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());
    let admin = Actor::any(&TestUser::admin("admin@example.com").to_user()).unwrap();
    let request = UpdateTherapistRequest {
        is_available: Some(false),
        ..UpdateTherapistRequest::default()
    };

    let result = service.update_therapist(&admin, Uuid::new_v4(), request, "token").await;
    assert_matches!(result, Err(TherapistError::NotFound));
}

#[tokio::test]
async fn empty_or_invalid_update_is_rejected() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("terapis@example.com");
    let actor = Actor::any(&therapist.to_user()).unwrap();
    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());

    let empty = service
        .update_therapist(&actor, therapist.uuid(), UpdateTherapistRequest::default(), "token")
        .await;
    assert_matches!(empty, Err(TherapistError::Validation(_)));

    let negative = UpdateTherapistRequest {
        price_per_session: Some(-1),
        ..UpdateTherapistRequest::default()
    };
    let result = service.update_therapist(&actor, therapist.uuid(), negative, "token").await;
    assert_matches!(result, Err(TherapistError::Validation(_)));

    let blank_name = UpdateTherapistRequest {
        full_name: Some("   ".to_string()),
        ..UpdateTherapistRequest::default()
    };
    let result = service.update_therapist(&actor, therapist.uuid(), blank_name, "token").await;
    assert_matches!(result, Err(TherapistError::Validation(_)));
}

#[tokio::test]
async fn availability_is_replaced_as_a_whole() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let therapist = TestUser::therapist("terapis@example.com");
    let token = JwtTestUtils::create_test_token(&therapist, &config.jwt_secret, None);

    Mock::given(method("GET"))
        .and(path("/rest/v1/therapists"))
        .and(query_param("id", format!("eq.{}", therapist.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::therapist_response(&therapist.id, 250000, true)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/therapist_availabilities"))
        .and(query_param("therapist_id", format!("eq.{}", therapist.id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/therapist_availabilities"))
        .and(body_partial_json(json!([
            { "therapist_id": therapist.id, "day_of_week": 1, "start_time": "09:00", "end_time": "12:00", "is_active": true },
            { "therapist_id": therapist.id, "day_of_week": 3, "start_time": "13:00", "end_time": "17:00", "is_active": false }
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::availability_response(&therapist.id, 1, "09:00", "12:00"),
            MockSupabaseResponses::availability_response(&therapist.id, 3, "13:00", "17:00")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = send(
        &config,
        "POST",
        &format!("/{}/availability", therapist.id),
        Some(&token),
        Some(json!({ "availability": [
            { "day_of_week": 1, "start_time": "09:00", "end_time": "12:00" },
            { "day_of_week": 3, "start_time": "13:00", "end_time": "17:00", "is_active": false }
        ] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["availability"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_window_writes_nothing() {
    let mock_server = MockServer::start().await;
    let therapist = TestUser::therapist("terapis@example.com");

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = TherapistService::new(&TestConfig::with_url(&mock_server.uri()).to_app_config());
    let actor = Actor::any(&therapist.to_user()).unwrap();
    let request: SetAvailabilityRequest = serde_json::from_value(json!({ "availability": [
        { "day_of_week": 1, "start_time": "09:00", "end_time": "12:00" },
        { "day_of_week": 2, "start_time": "17:00", "end_time": "09:00" }
    ] }))
    .unwrap();

    let result = service.set_availability(&actor, therapist.uuid(), request, "token").await;
    assert_matches!(result, Err(TherapistError::Validation(_)));
}
