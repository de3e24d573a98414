use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use stayhub_auth::IdentityContext;

use crate::app::errors::{ApiError, NO_TOKEN_MESSAGE};

/// Identity of the caller, required.
///
/// The auth middleware attaches an [`IdentityContext`] when a valid bearer
/// token is presented; handlers that take this extractor answer 401 without
/// one, before the handler body runs.
#[derive(Debug, Clone)]
pub struct Authenticated(pub IdentityContext);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(Authenticated)
            .ok_or(ApiError::Unauthenticated(NO_TOKEN_MESSAGE))
    }
}
