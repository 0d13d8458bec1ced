use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError, Actor, Role};

use crate::models::{BookingListQuery, CreateBookingRequest, UpdateStatusRequest};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient])?;
    request.validate()?;

    let service = BookingService::new(&state);
    let booking = service.create(&actor, &request, auth.token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "booking": booking,
            "message": "Booking created successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_my_bookings(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = BookingService::new(&state);
    let result = service.list_mine(&actor, &query, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "bookings": result.data,
        "pagination": result.pagination
    })))
}

#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::any(&user)?;

    let service = BookingService::new(&state);
    let booking = service.get_by_id(&actor, booking_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking
    })))
}

#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Therapist, Role::Admin])?;

    let service = BookingService::new(&state);
    let update = service
        .update_status(&actor, booking_id, request.status, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "booking": update.booking(),
        "result": update,
        "message": "Booking status updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn confirm_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Therapist, Role::Admin])?;

    let service = BookingService::new(&state);
    let confirmation = service
        .confirm_and_request_payment(&actor, booking_id, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "booking": confirmation.booking,
        "payment": confirmation.payment,
        "message": "Booking confirmed, awaiting payment"
    })))
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = Actor::authorize(&user, &[Role::Patient, Role::Therapist, Role::Admin])?;

    let service = BookingService::new(&state);
    let booking = service.cancel(&actor, booking_id, auth.token()).await?;

    Ok(Json(json!({
        "success": true,
        "booking": booking,
        "message": "Booking cancelled successfully"
    })))
}
