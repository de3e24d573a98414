use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use stayhub_auth::{OwnerPolicy, ProfileUpdate, Role, User};
use stayhub_core::UserId;

use crate::app::errors::{ApiError, ApiResult};
use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::dto;
use crate::authz;
use crate::context::Authenticated;

const NOT_FOUND: &str = "User not found";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/profile", put(update_profile))
        .route("/:id", get(get_user).delete(delete_user))
}

/// GET /api/users - admin only
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
) -> ApiResult<Response> {
    authz::require_role(&identity, Role::Admin)?;
    let users = services.users.list_all().await?;
    Ok(Json(dto::to_json(&users)?).into_response())
}

/// GET /api/users/:id - the user themselves or an admin
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: UserId = parse_id(&id)?;
    let found = services.users.find_by_id(id).await?;
    let user = authz::require_owner(&identity, found, OwnerPolicy::OwnerOr(Role::Admin), NOT_FOUND)?;
    Ok(Json(dto::to_json(&user)?).into_response())
}

/// PUT /api/users/profile - create or update the caller's own profile
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(update) = body?;
    let now = Utc::now();

    let user = match services.users.find_by_id(identity.id()).await? {
        Some(mut user) => {
            user.apply_profile(&identity, update, now)?;
            user
        }
        None => User::create_profile(&identity, update, now)?,
    };
    let user = services.users.save(user).await?;

    Ok(Json(dto::to_json(&user)?).into_response())
}

/// DELETE /api/users/:id - admin only
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    authz::require_role(&identity, Role::Admin)?;
    let id: UserId = parse_id(&id)?;

    if !services.users.delete(id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!(user_id = %id, actor = %identity.id(), "user removed");
    Ok(Json(dto::message("User removed")).into_response())
}
