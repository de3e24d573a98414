//! Route-level authorization helpers.
//!
//! Role gates run before any storage call; ownership gates run on the loaded
//! resource via [`guard`], so a missing resource is reported as 404 before any
//! ownership decision is made.

use stayhub_auth::{GuardError, IdentityContext, OwnerPolicy, Role, enforce, evaluate_role, guard};
use stayhub_core::Owned;

use crate::app::errors::ApiError;

pub fn require_role(identity: &IdentityContext, role: Role) -> Result<(), ApiError> {
    enforce(|| evaluate_role(Some(identity), role))?;
    Ok(())
}

/// Existence check, then ownership check, on a freshly loaded resource.
pub fn require_owner<R: Owned>(
    identity: &IdentityContext,
    found: Option<R>,
    policy: OwnerPolicy,
    not_found: &str,
) -> Result<R, ApiError> {
    guard(identity, found, policy).map_err(|err| match err {
        GuardError::NotFound => ApiError::not_found(not_found),
        GuardError::Authz(e) => e.into(),
    })
}
