use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Extension, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError, Actor, Role};

use crate::models::{AgreementAudit, ConsentFlags, CreateConsentRequest};
use crate::services::ConsentService;

pub async fn get_consent_text() -> Json<Value> {
    Json(json!({
        "success": true,
        "consent": ConsentService::current_text()
    }))
}

#[axum::debug_handler]
pub async fn create_consent(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConsentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;

    let service = ConsentService::new(&state);
    let consent = service.create_consent(&actor, request.booking_id, auth.token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "consent": consent,
            "message": "Consent created successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn agree_consent(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consent_id): Path<Uuid>,
    headers: HeaderMap,
    Json(flags): Json<ConsentFlags>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;

    let audit = AgreementAudit::from_headers(
        headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()),
        headers.get(USER_AGENT).and_then(|v| v.to_str().ok()),
    );

    let service = ConsentService::new(&state);
    let consent = service
        .agree(&actor, consent_id, &flags, &audit, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "consent": consent,
        "message": "Consent agreed successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_consent_by_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = ConsentService::new(&state);
    let consent = service.get_by_booking(&actor, booking_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "consent": consent
    })))
}

#[axum::debug_handler]
pub async fn list_patient_consents(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = ConsentService::new(&state);
    let consents = service.list_by_patient(&actor, patient_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "consents": consents
    })))
}

#[axum::debug_handler]
pub async fn validate_consent(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    Actor::any(&user)?;

    let service = ConsentService::new(&state);
    let is_valid = service.validate_for_booking(booking_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "is_valid": is_valid,
        "message": if is_valid { "Consent is valid" } else { "Consent is not valid" }
    })))
}
