use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

fn client_for(server: &MockServer) -> SupabaseClient {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        ..AppConfig::default()
    };
    SupabaseClient::new(&config)
}

#[tokio::test]
async fn sends_api_key_and_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(header("apikey", "test-anon-key"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let rows: Vec<Value> = client_for(&server)
        .request(Method::GET, "/rest/v1/bookings", Some("user-token"), None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn unique_violation_maps_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"payments_booking_id_key\""
        })))
        .mount(&server)
        .await;

    let result: Result<Vec<Value>, _> = client_for(&server)
        .request(Method::POST, "/rest/v1/payments", Some("t"), Some(json!({"booking_id": "x"})))
        .await;

    assert_matches!(result, Err(DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn empty_body_reads_as_no_rows() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/payments"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let rows: Vec<Value> = client_for(&server)
        .request(Method::DELETE, "/rest/v1/payments?id=eq.1", Some("t"), None)
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn exact_count_is_read_from_content_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/payments"))
        .and(query_param("status", "eq.PAID"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-1/23")
                .set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .mount(&server)
        .await;

    let (rows, total): (Vec<Value>, u64) = client_for(&server)
        .request_with_count("/rest/v1/payments?status=eq.PAID&limit=2&offset=0", Some("t"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(total, 23);
}
