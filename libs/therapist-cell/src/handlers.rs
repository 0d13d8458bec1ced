use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError, Actor, Page, Role};

use crate::models::{SetAvailabilityRequest, SlotQuery, TherapistFilter, UpdateTherapistRequest};
use crate::services::{candidate_slots, slots::DEFAULT_HORIZON_DAYS, TherapistService};

#[axum::debug_handler]
pub async fn list_therapists(
    State(state): State<Arc<AppConfig>>,
    Query(filter): Query<TherapistFilter>,
) -> Result<Json<Value>, AppError> {
    let page = Page::new(filter.page.unwrap_or(1), filter.limit.unwrap_or(10));

    let service = TherapistService::new(&state);
    let result = service.list_therapists(&filter, page, None).await?;

    Ok(Json(json!({
        "success": true,
        "therapists": result.data,
        "pagination": result.pagination
    })))
}

#[axum::debug_handler]
pub async fn get_therapist(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TherapistService::new(&state);
    let profile = service.get_profile(therapist_id, None).await?;

    Ok(Json(json!({
        "success": true,
        "therapist": profile
    })))
}

#[axum::debug_handler]
pub async fn get_candidate_slots(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let days = query.days.unwrap_or(DEFAULT_HORIZON_DAYS);

    let service = TherapistService::new(&state);
    let template = service.get_availability(therapist_id, None).await?;
    let slots = candidate_slots(&template, from, days)?;

    Ok(Json(json!({
        "success": true,
        "therapist_id": therapist_id,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Path(therapist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = TherapistService::new(&state);
    let availability = service.get_availability(therapist_id, None).await?;

    Ok(Json(json!({
        "success": true,
        "therapist_id": therapist_id,
        "availability": availability
    })))
}

#[axum::debug_handler]
pub async fn update_therapist(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(therapist_id): Path<Uuid>,
    Json(request): Json<UpdateTherapistRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Therapist, Role::Admin])?;

    let service = TherapistService::new(&state);
    let therapist = service
        .update_therapist(&actor, therapist_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "therapist": therapist,
        "message": "Therapist updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(therapist_id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Therapist, Role::Admin])?;

    let service = TherapistService::new(&state);
    let availability = service
        .set_availability(&actor, therapist_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "availability": availability,
        "message": "Availability set successfully"
    })))
}
