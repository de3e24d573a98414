use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::{OwnerPolicy, Role};
use stayhub_core::PropertyId;
use stayhub_properties::{NewProperty, Property, PropertyFilter, PropertyPatch, PropertyQuery};

use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::dto;
use crate::authz;
use crate::context::Authenticated;

const NOT_FOUND: &str = "Property not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route(
            "/:id",
            get(get_property).put(update_property).delete(delete_property),
        )
}

/// GET /api/properties - public search with optional filters
pub async fn list_properties(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<PropertyQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    let filter = PropertyFilter::from_query(query)?;

    let properties = services.properties.search(&filter).await?;
    let hosts = services.users_by_id(properties.iter().map(|p| p.host)).await?;

    let body = properties
        .iter()
        .map(|p| dto::property_to_json(p, &hosts))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(body).into_response())
}

/// GET /api/properties/:id - public
pub async fn get_property(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: PropertyId = parse_id(&id)?;
    let property = services
        .properties
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    let hosts = services.users_by_id([property.host]).await?;

    Ok(Json(dto::property_to_json(&property, &hosts)?).into_response())
}

/// POST /api/properties - the caller becomes the host
pub async fn create_property(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    body: Result<Json<NewProperty>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(body) = body?;
    let property = Property::create(identity.id(), body, Utc::now())?;
    let property = services.properties.save(property).await?;

    tracing::info!(property_id = %property.id, host = %property.host, "property created");
    Ok((StatusCode::CREATED, Json(dto::to_json(&property)?)).into_response())
}

/// PUT /api/properties/:id - host or admin
pub async fn update_property(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<PropertyPatch>, JsonRejection>,
) -> ApiResult<Response> {
    let id: PropertyId = parse_id(&id)?;

    let found = services.properties.find_by_id(id).await?;
    let mut property = authz::require_owner(&identity, found, OwnerPolicy::OwnerOr(Role::Admin), NOT_FOUND)?;

    // The body is only looked at once the caller may touch the listing.
    let Json(patch) = body?;
    property.apply(patch, Utc::now())?;
    let property = services.properties.save(property).await?;

    Ok(Json(dto::to_json(&property)?).into_response())
}

/// DELETE /api/properties/:id - host or admin
pub async fn delete_property(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: PropertyId = parse_id(&id)?;

    let found = services.properties.find_by_id(id).await?;
    let property = authz::require_owner(&identity, found, OwnerPolicy::OwnerOr(Role::Admin), NOT_FOUND)?;

    if !services.properties.delete(property.id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!(property_id = %property.id, actor = %identity.id(), "property removed");
    Ok(Json(dto::message("Property removed")).into_response())
}
