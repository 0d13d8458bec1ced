use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{
    get_availability, get_candidate_slots, get_therapist, list_therapists, set_availability,
    update_therapist,
};

pub fn therapist_routes(state: Arc<AppConfig>) -> Router {
    // Directory reads need no account
    let public_routes = Router::new()
        .route("/", get(list_therapists))
        .route("/{therapist_id}", get(get_therapist))
        .route("/{therapist_id}/availability", get(get_availability))
        .route("/{therapist_id}/slots", get(get_candidate_slots));

    let protected_routes = Router::new()
        .route("/{therapist_id}", put(update_therapist))
        .route("/{therapist_id}/availability", post(set_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
