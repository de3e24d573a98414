//! Access policy evaluation.
//!
//! - No IO
//! - No panics
//! - No business logic (pure policy checks)
//!
//! Role checks and ownership checks are independent; callers compose them
//! per endpoint.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{IdentityContext, Role};

/// Machine-readable cause of a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// No identity was attached to the request.
    Unauthenticated,
    /// The identity carries no usable role.
    MissingRole,
    /// The identity's role differs from the required one.
    RoleMismatch,
    /// The resource has no owner reference.
    NoOwner,
    /// The resource is owned by someone else.
    NotOwner,
}

/// Outcome of one policy evaluation.
///
/// The reason is for logs and audits only; it must never reach the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<DenialKind>,
}

impl AccessDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: Some(reason.into()),
            denial: None,
        }
    }

    pub fn deny(kind: DenialKind, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            denial: Some(kind),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn into_result(self) -> Result<(), AuthzError> {
        if self.allowed {
            return Ok(());
        }
        Err(AuthzError::Denied {
            kind: self.denial.unwrap_or(DenialKind::Unauthenticated),
            reason: self.reason.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("access denied ({kind:?}): {reason}")]
    Denied { kind: DenialKind, reason: String },

    /// Evaluation itself failed; treated as a deny that must surface as 500.
    #[error("authorization evaluation failed: {0}")]
    Fault(String),
}

/// Canonical string form of an identifier.
///
/// Ids reach the policy layer from tokens, paths and storage in different
/// shapes. UUIDs compare by their lowercase hyphenated form; anything else
/// compares by its trimmed text.
pub fn canonical_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match Uuid::parse_str(trimmed) {
        Ok(uuid) => uuid.hyphenated().to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Role gate: ALLOW only when the identity holds exactly `required`.
pub fn evaluate_role(identity: Option<&IdentityContext>, required: Role) -> AccessDecision {
    let Some(identity) = identity else {
        return AccessDecision::deny(DenialKind::Unauthenticated, "no identity on request");
    };

    match identity.role() {
        None => AccessDecision::deny(
            DenialKind::MissingRole,
            format!("identity {} carries no recognised role", identity.id()),
        ),
        Some(role) if role == required => {
            AccessDecision::allow(format!("identity {} holds role '{required}'", identity.id()))
        }
        Some(role) => AccessDecision::deny(
            DenialKind::RoleMismatch,
            format!("identity {} has role '{role}', requires '{required}'", identity.id()),
        ),
    }
}

/// Ownership gate: ALLOW iff the identity is the resource owner.
pub fn evaluate_ownership<O>(identity: Option<&IdentityContext>, owner: Option<&O>) -> AccessDecision
where
    O: core::fmt::Display + ?Sized,
{
    let Some(identity) = identity else {
        return AccessDecision::deny(DenialKind::Unauthenticated, "no identity on request");
    };
    let Some(owner) = owner else {
        return AccessDecision::deny(DenialKind::NoOwner, "resource has no owner");
    };

    let caller = canonical_id(&identity.id().to_string());
    let owner = canonical_id(&owner.to_string());
    if !owner.is_empty() && caller == owner {
        AccessDecision::allow(format!("identity {caller} owns the resource"))
    } else {
        AccessDecision::deny(
            DenialKind::NotOwner,
            format!("identity {caller} is not the owner ({owner})"),
        )
    }
}

/// Ownership gate with an explicit role override (e.g. admins moderating
/// listings). The ownership denial is reported when both checks fail.
pub fn evaluate_owner_or_role<O>(
    identity: Option<&IdentityContext>,
    owner: Option<&O>,
    override_role: Role,
) -> AccessDecision
where
    O: core::fmt::Display + ?Sized,
{
    let ownership = evaluate_ownership(identity, owner);
    if ownership.is_allowed() {
        return ownership;
    }

    let role = evaluate_role(identity, override_role);
    if role.is_allowed() { role } else { ownership }
}

/// Run an evaluation fail-closed.
///
/// A panic inside `evaluate` is logged and reported as [`AuthzError::Fault`];
/// it never turns into an allow.
pub fn enforce<F>(evaluate: F) -> Result<(), AuthzError>
where
    F: FnOnce() -> AccessDecision,
{
    let decision = catch_unwind(AssertUnwindSafe(evaluate)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(error = %message, "authorization evaluation panicked; denying");
        AuthzError::Fault(message)
    })?;

    if !decision.allowed {
        tracing::debug!(denial = ?decision.denial, reason = ?decision.reason, "access denied");
    }
    decision.into_result()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use stayhub_core::UserId;
    use uuid::Uuid;

    use super::*;

    fn identity(role: Option<Role>) -> IdentityContext {
        IdentityContext::new(UserId::new(), role)
    }

    fn user_id_from(bits: u128) -> UserId {
        UserId::from_uuid(Uuid::from_u128(bits))
    }

    fn any_role() -> impl Strategy<Value = Option<Role>> {
        prop_oneof![Just(None), Just(Some(Role::User)), Just(Some(Role::Admin))]
    }

    proptest! {
        #[test]
        fn non_admins_never_pass_admin_gate(bits in any::<u128>(), role in any_role()) {
            prop_assume!(role != Some(Role::Admin));
            let who = IdentityContext::new(user_id_from(bits), role);
            prop_assert!(!evaluate_role(Some(&who), Role::Admin).allowed);
        }

        #[test]
        fn admins_always_pass_admin_gate(bits in any::<u128>()) {
            let who = IdentityContext::new(user_id_from(bits), Some(Role::Admin));
            prop_assert!(evaluate_role(Some(&who), Role::Admin).allowed);
        }

        #[test]
        fn absent_identity_never_passes_role_gate(admin in any::<bool>()) {
            let required = if admin { Role::Admin } else { Role::User };
            let decision = evaluate_role(None, required);
            prop_assert!(!decision.allowed);
            prop_assert_eq!(decision.denial, Some(DenialKind::Unauthenticated));
        }

        #[test]
        fn ownership_matches_canonical_ids(a in any::<u128>(), b in any::<u128>(), upper in any::<bool>()) {
            let who = IdentityContext::new(user_id_from(a), Some(Role::User));
            let mut owner = Uuid::from_u128(b).to_string();
            if upper {
                owner = owner.to_uppercase();
            }
            let decision = evaluate_ownership(Some(&who), Some(owner.as_str()));
            prop_assert_eq!(decision.allowed, a == b);
        }

        #[test]
        fn ownerless_resources_are_never_mine(a in any::<u128>(), role in any_role()) {
            let who = IdentityContext::new(user_id_from(a), role);
            let decision = evaluate_ownership::<UserId>(Some(&who), None);
            prop_assert!(!decision.allowed);
            prop_assert_eq!(decision.denial, Some(DenialKind::NoOwner));
        }
    }

    #[test]
    fn role_gate_has_no_hierarchy() {
        let admin = identity(Some(Role::Admin));
        assert!(!evaluate_role(Some(&admin), Role::User).allowed);

        let user = identity(Some(Role::User));
        let decision = evaluate_role(Some(&user), Role::Admin);
        assert_eq!(decision.denial, Some(DenialKind::RoleMismatch));
    }

    #[test]
    fn missing_role_is_denied_not_defaulted() {
        let nobody = identity(None);
        let decision = evaluate_role(Some(&nobody), Role::User);
        assert!(!decision.allowed);
        assert_eq!(decision.denial, Some(DenialKind::MissingRole));
    }

    #[test]
    fn ownership_compares_across_representations() {
        let id = UserId::new();
        let who = IdentityContext::new(id, None);
        let padded = format!(" {} ", id.to_string().to_uppercase());

        assert!(evaluate_ownership(Some(&who), Some(&id)).allowed);
        assert!(evaluate_ownership(Some(&who), Some(padded.as_str())).allowed);
        assert!(!evaluate_ownership(Some(&who), Some("")).allowed);
    }

    #[test]
    fn owner_or_role_grants_admin_override_only() {
        let owner = UserId::new();
        let admin = identity(Some(Role::Admin));
        let stranger = identity(Some(Role::User));

        assert!(evaluate_owner_or_role(Some(&admin), Some(&owner), Role::Admin).allowed);

        let denied = evaluate_owner_or_role(Some(&stranger), Some(&owner), Role::Admin);
        assert!(!denied.allowed);
        assert_eq!(denied.denial, Some(DenialKind::NotOwner));
    }

    #[test]
    fn enforce_fails_closed_on_panic() {
        let result = enforce(|| panic!("policy table corrupted"));
        assert_eq!(result, Err(AuthzError::Fault("policy table corrupted".to_string())));
    }

    #[test]
    fn enforce_maps_decisions() {
        let admin = identity(Some(Role::Admin));
        assert_eq!(enforce(|| evaluate_role(Some(&admin), Role::Admin)), Ok(()));

        let err = enforce(|| evaluate_role(None, Role::Admin)).unwrap_err();
        assert!(matches!(err, AuthzError::Denied { kind: DenialKind::Unauthenticated, .. }));
    }
}
