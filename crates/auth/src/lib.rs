//! `stayhub-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it verifies
//! tokens into an [`IdentityContext`] and answers allow/deny questions about
//! roles and resource ownership.

pub mod authorize;
pub mod claims;
pub mod guard;
pub mod jwt;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{
    AccessDecision, AuthzError, DenialKind, canonical_id, enforce, evaluate_owner_or_role,
    evaluate_ownership, evaluate_role,
};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use guard::{GuardError, OwnerPolicy, guard};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use principal::IdentityContext;
pub use roles::{Role, UnknownRole};
pub use user::{ProfileUpdate, User};
