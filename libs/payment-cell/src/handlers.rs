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

use crate::models::{RejectPaymentRequest, UploadProofRequest, VerifyPaymentRequest};
use crate::services::PaymentService;

#[axum::debug_handler]
pub async fn upload_payment_proof(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<UploadProofRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;
    request.validate()?;

    let service = PaymentService::new(&state);
    let payment = service
        .upload_proof(&actor, request.booking_id, request.method, &request.payment_proof, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "payment": payment,
        "message": "Payment proof uploaded successfully"
    })))
}

#[axum::debug_handler]
pub async fn verify_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Admin])?;

    let service = PaymentService::new(&state);
    let payment = service
        .verify(&actor, payment_id, request.notes.as_deref(), auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "payment": payment,
        "message": "Payment verified successfully"
    })))
}

#[axum::debug_handler]
pub async fn reject_payment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(payment_id): Path<Uuid>,
    Json(request): Json<RejectPaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Admin])?;
    request.validate()?;

    let service = PaymentService::new(&state);
    let payment = service
        .reject(&actor, payment_id, request.notes.trim(), auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "payment": payment,
        "message": "Payment rejected"
    })))
}

#[axum::debug_handler]
pub async fn get_pending_payments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    Actor::authorize(&user, &[Role::Admin])?;

    let service = PaymentService::new(&state);
    let result = service.pending_payments(query.page(), auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "payments": result.data,
        "pagination": result.pagination
    })))
}

#[axum::debug_handler]
pub async fn get_payment_by_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = PaymentService::new(&state);
    let payment = service.get_by_booking(&actor, booking_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "payment": payment
    })))
}
