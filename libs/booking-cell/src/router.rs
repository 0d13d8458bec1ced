use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    cancel_booking, confirm_booking, create_booking, get_booking, get_my_bookings,
    update_booking_status,
};

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(create_booking))
        .route("/my-bookings", get(get_my_bookings))
        .route("/{booking_id}", get(get_booking))
        .route("/{booking_id}/status", put(update_booking_status))
        .route("/{booking_id}/confirm", post(confirm_booking))
        .route("/{booking_id}/cancel", put(cancel_booking))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
