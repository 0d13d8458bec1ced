use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    agree_consent, create_consent, get_consent_by_booking, get_consent_text,
    list_patient_consents, validate_consent,
};

pub fn consent_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/text", get(get_consent_text));

    let protected_routes = Router::new()
        .route("/", post(create_consent))
        .route("/{consent_id}/agree", post(agree_consent))
        .route("/booking/{booking_id}", get(get_consent_by_booking))
        .route("/patient/{patient_id}", get(list_patient_consents))
        .route("/validate/{booking_id}", get(validate_consent))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
