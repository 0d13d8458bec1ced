use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use axum_extra::TypedHeader;
use futures::{SinkExt, StreamExt};
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError, Actor, PageQuery};

use crate::models::SendMessageRequest;
use crate::services::{ChatRelay, ChatService};

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(relay): Extension<ChatRelay>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = Actor::any(&user)?;
    let content = request.content()?;

    let service = ChatService::new(&state, relay);
    let message = service.send(&actor, booking_id, content, auth.token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(relay): Extension<ChatRelay>,
    Path(booking_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = ChatService::new(&state, relay);
    let result = service
        .history(&actor, booking_id, query.page(), auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "messages": result.data,
        "pagination": result.pagination
    })))
}

/// Upgrade to a WebSocket bound to one booking's chat topic. Access is checked
/// before the upgrade.
#[axum::debug_handler]
pub async fn chat_socket(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Extension(relay): Extension<ChatRelay>,
    Path(booking_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let actor = Actor::any(&user)?;

    let service = ChatService::new(&state, relay.clone());
    service.authorize_booking(&actor, booking_id, auth.token()).await?;

    let token = auth.token().to_string();
    Ok(ws.on_upgrade(move |socket| relay_socket(socket, service, relay, actor, booking_id, token)))
}

async fn relay_socket(
    socket: WebSocket,
    service: ChatService,
    relay: ChatRelay,
    actor: Actor,
    booking_id: Uuid,
    auth_token: String,
) {
    info!("User {} joined chat for booking {}", actor.user_id(), booking_id);

    let mut subscription = relay.subscribe(booking_id).await;
    let (mut sink, mut stream) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            match subscription.recv().await {
                Ok(frame) => {
                    if sink.send(WsMessage::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Chat subscriber for booking {} dropped {} message(s)", booking_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut receive = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            match frame {
                WsMessage::Text(text) => {
                    let request = SendMessageRequest { content: text.as_str().to_string() };
                    let content = match request.content() {
                        Ok(content) => content,
                        Err(e) => {
                            debug!("Ignoring chat frame for booking {}: {}", booking_id, e);
                            continue;
                        }
                    };
                    if let Err(e) = service
                        .persist_and_publish(&actor, booking_id, content, &auth_token)
                        .await
                    {
                        warn!("Could not store chat message for booking {}: {}", booking_id, e);
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut forward => {
            receive.abort();
            let _ = receive.await;
        }
        _ = &mut receive => {
            forward.abort();
            let _ = forward.await;
        }
    }

    relay.prune(booking_id).await;
    debug!("Chat connection for booking {} closed", booking_id);
}
