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
use shared_models::{auth::User, error::AppError, Actor, PageQuery, Role};

use crate::models::UpdatePatientRequest;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;

    let service = PatientService::new(&state);
    let patient = service.get_own_profile(&actor, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;

    let service = PatientService::new(&state);
    let patient = service.update_own_profile(&actor, request, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient,
        "message": "Profile updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Actor::authorize(&user, &[Role::Admin, Role::Therapist])?;

    let service = PatientService::new(&state);
    let patient = service.get_patient(patient_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    Actor::authorize(&user, &[Role::Admin])?;

    let service = PatientService::new(&state);
    let result = service.list_patients(query.page(), auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "patients": result.data,
        "pagination": result.pagination
    })))
}
