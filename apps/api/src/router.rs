use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;

use booking_cell::booking_routes;
use chat_cell::{chat_routes, ChatRelay};
use consent_cell::consent_routes;
use notification_cell::notification_routes;
use patient_cell::patient_routes;
use payment_cell::payment_routes;
use shared_config::AppConfig;
use therapist_cell::therapist_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Fisioku API is running!" }))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/bookings", booking_routes(state.clone()))
        .nest("/api/consents", consent_routes(state.clone()))
        .nest("/api/payments", payment_routes(state.clone()))
        .nest("/api/therapists", therapist_routes(state.clone()))
        .nest("/api/patients", patient_routes(state.clone()))
        .nest("/api/notifications", notification_routes(state.clone()))
        .nest("/api/chat", chat_routes(state, ChatRelay::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(Arc::new(AppConfig::default()))
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cell_routes_require_a_token() {
        for uri in [
            "/api/bookings/my-bookings",
            "/api/payments/pending",
            "/api/notifications",
            "/api/patients/profile",
        ] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn therapist_directory_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/api/therapists").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn consent_text_is_public() {
        let response = app()
            .oneshot(Request::builder().uri("/api/consents/text").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
