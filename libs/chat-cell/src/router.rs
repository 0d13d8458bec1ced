use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{chat_socket, get_messages, send_message};
use crate::services::ChatRelay;

pub fn chat_routes(state: Arc<AppConfig>, relay: ChatRelay) -> Router {
    let protected_routes = Router::new()
        .route("/{booking_id}/messages", get(get_messages).post(send_message))
        .route("/{booking_id}/ws", get(chat_socket))
        .layer(Extension(relay))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
