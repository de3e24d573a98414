use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use stayhub_auth::{IdentityContext, JwtValidator};

use crate::app::errors::{self, ApiError, ErrorDetail, NO_TOKEN_MESSAGE};
use crate::config::AppEnvironment;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the bearer token, if any, into an [`IdentityContext`].
///
/// No `Authorization` header: the request continues anonymously and only
/// public handlers will accept it. A header that is present but malformed,
/// or a token that fails verification, is rejected here with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = match extract_bearer(req.headers())? {
        None => None,
        Some(token) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "bearer token rejected");
                ApiError::from(e)
            })?;
            Some(IdentityContext::from_claims(&claims)?)
        }
    };

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| ApiError::Unauthenticated(NO_TOKEN_MESSAGE))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated(NO_TOKEN_MESSAGE))?
        .trim();
    if token.is_empty() {
        return Err(ApiError::Unauthenticated(NO_TOKEN_MESSAGE));
    }

    Ok(Some(token))
}

/// Give every error response the JSON error body.
///
/// Responses built from [`ApiError`] are re-rendered with their `stack` in
/// development. Errors produced by the router itself (405, path rejections)
/// carry a plain-text or empty body and are rewritten in every environment.
pub async fn error_detail_middleware(
    State(environment): State<AppEnvironment>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let status = response.status();

    let stashed = response.extensions_mut().remove::<ErrorDetail>();
    let (detail, allow) = match stashed {
        Some(detail) if environment.is_development() => (detail, None),
        Some(_) => return response,
        None if is_error(status) && !is_json(response.headers()) => {
            router_error_detail(response).await
        }
        None => return response,
    };

    let stack = environment.is_development().then_some(detail.stack.as_str());
    let mut rendered = errors::json_error(status, &detail.message, stack);
    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}

/// Detail for a response the router produced without an [`ApiError`], plus
/// its `Allow` header when it had one.
async fn router_error_detail(response: Response) -> (ErrorDetail, Option<HeaderValue>) {
    let status = response.status();
    let (parts, body) = response.into_parts();
    let text = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("Error").to_string()
    } else {
        text
    };

    let detail = ErrorDetail {
        stack: format!("{status}: {message}"),
        message,
    };
    (detail, parts.headers.get(header::ALLOW).cloned())
}

const MAX_ERROR_BODY: usize = 16 * 1024;

fn is_error(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert_eq!(extract_bearer(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), Some("abc.def"));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(extract_bearer(&headers("Basic dXNlcg==")).is_err());
        assert!(extract_bearer(&headers("Bearer ")).is_err());
    }
}
