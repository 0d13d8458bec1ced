use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError, Actor, Page};

use crate::models::NotificationListQuery;
use crate::services::NotificationService;

#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;
    let page = Page::new(query.page.unwrap_or(1), query.limit.unwrap_or(10));

    let service = NotificationService::new(&state);
    let result = service
        .list_for_user(&actor, page, query.unread_only, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "notifications": result.data,
        "pagination": result.pagination
    })))
}

#[axum::debug_handler]
pub async fn mark_notification_read(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = NotificationService::new(&state);
    let notification = service.mark_read(&actor, notification_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "notification": notification
    })))
}
