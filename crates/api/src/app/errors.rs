use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use stayhub_auth::{AuthzError, TokenValidationError};
use stayhub_core::DomainError;
use stayhub_infra::StoreError;

pub const FORBIDDEN_MESSAGE: &str = "Access denied. Insufficient permissions.";
pub const NO_TOKEN_MESSAGE: &str = "Not authorized, no token";
pub const TOKEN_FAILED_MESSAGE: &str = "Not authorized, token failed";

/// Every failure a handler can answer with.
///
/// The `Display` text is the client-facing `message`; internal detail only
/// reaches the client through the development-mode `stack` field.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Duplicate field value entered")]
    Conflict(&'static str),

    #[error("Internal Server Error")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error details stashed on the response for the development-mode renderer.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub stack: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = ?self, status = status.as_u16(), "request rejected");
        }

        let message = self.to_string();
        let mut response = json_error(status, &message, None);
        response.extensions_mut().insert(ErrorDetail {
            message,
            stack: format!("{self:?}"),
        });
        response
    }
}

pub fn json_error(status: StatusCode, message: &str, stack: Option<&str>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message,
            "stack": stack,
        })),
    )
        .into_response()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(_) => ApiError::Validation("Invalid ID format".to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => ApiError::Conflict(field),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Denied { .. } => ApiError::Forbidden,
            AuthzError::Fault(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<TokenValidationError> for ApiError {
    fn from(_: TokenValidationError) -> Self {
        ApiError::Unauthenticated(TOKEN_FAILED_MESSAGE)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
