use axum::{http::StatusCode, http::Uri, response::IntoResponse, Json};

use crate::app::errors::ApiError;
use crate::context::Authenticated;

pub async fn root() -> &'static str {
    "API is running..."
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Authenticated(identity): Authenticated) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": identity.id().to_string(),
        "role": identity.role().map(|r| r.as_str()),
    }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Not Found - {uri}"))
}
