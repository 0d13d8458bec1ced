use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    get_payment_by_booking, get_pending_payments, reject_payment, upload_payment_proof,
    verify_payment,
};

pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/upload-proof", post(upload_payment_proof))
        .route("/pending", get(get_pending_payments))
        .route("/booking/{booking_id}", get(get_payment_by_booking))
        .route("/{payment_id}/verify", post(verify_payment))
        .route("/{payment_id}/reject", post(reject_payment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
