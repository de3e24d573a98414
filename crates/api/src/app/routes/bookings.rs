use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use stayhub_auth::{OwnerPolicy, Role};
use stayhub_bookings::{Booking, NewBooking};
use stayhub_core::BookingId;

use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::dto;
use crate::authz;
use crate::context::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_my_bookings).post(create_booking))
        .route("/admin", get(list_all_bookings))
        .route("/:id", delete(delete_booking))
}

/// POST /api/bookings - the caller becomes the guest
pub async fn create_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    body: Result<Json<NewBooking>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;

    if services.properties.find_by_id(body.property_id).await?.is_none() {
        return Err(ApiError::not_found("Property not found"));
    }

    let booking = Booking::create(identity.id(), body, Utc::now())?;
    let booking = services.bookings.save(booking).await?;

    tracing::info!(booking_id = %booking.id, user = %booking.user, "booking created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking created successfully",
            "booking": dto::to_json(&booking)?,
        })),
    )
        .into_response())
}

/// GET /api/bookings - the caller's own bookings
pub async fn list_my_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Response> {
    let bookings = services.bookings.list_by_user(identity.id()).await?;
    let properties = services.properties_by_id(bookings.iter().map(|b| b.property)).await?;

    let body = bookings
        .iter()
        .map(|b| dto::own_booking_to_json(b, &properties))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body).into_response())
}

/// GET /api/bookings/admin - every booking, admin only
pub async fn list_all_bookings(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Response> {
    authz::require_role(&identity, Role::Admin)?;

    let bookings = services.bookings.list_all().await?;
    let properties = services.properties_by_id(bookings.iter().map(|b| b.property)).await?;
    let users = services.users_by_id(bookings.iter().map(|b| b.user)).await?;

    let body = bookings
        .iter()
        .map(|b| dto::admin_booking_to_json(b, &properties, &users))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body).into_response())
}

/// DELETE /api/bookings/:id - guest or admin
pub async fn delete_booking(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: BookingId = parse_id(&id)?;

    let found = services.bookings.find_by_id(id).await?;
    let booking = authz::require_owner(&identity, found, OwnerPolicy::OwnerOr(Role::Admin), "Booking not found")?;

    if !services.bookings.delete(booking.id).await? {
        return Err(ApiError::not_found("Booking not found"));
    }

    tracing::info!(booking_id = %booking.id, actor = %identity.id(), "booking deleted");
    Ok(Json(dto::message("Booking deleted successfully")).into_response())
}
