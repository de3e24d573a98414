//! Resource guard: existence check, then ownership check, then hand back the
//! resource for mutation.

use thiserror::Error;

use stayhub_core::Owned;

use crate::{AuthzError, IdentityContext, Role, enforce, evaluate_owner_or_role, evaluate_ownership};

/// Which identities may mutate an owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// Only the owner.
    OwnerOnly,
    /// The owner, or any identity holding the given role.
    OwnerOr(Role),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("resource not found")]
    NotFound,

    #[error(transparent)]
    Authz(#[from] AuthzError),
}

/// Gate a loaded resource before mutating it.
///
/// `found` is the result of the storage lookup. A missing resource is always
/// reported as [`GuardError::NotFound`], even when the caller would not have
/// been allowed to touch it.
pub fn guard<R: Owned>(
    identity: &IdentityContext,
    found: Option<R>,
    policy: OwnerPolicy,
) -> Result<R, GuardError> {
    let resource = found.ok_or(GuardError::NotFound)?;

    enforce(|| match policy {
        OwnerPolicy::OwnerOnly => evaluate_ownership(Some(identity), resource.owner_id()),
        OwnerPolicy::OwnerOr(role) => evaluate_owner_or_role(Some(identity), resource.owner_id(), role),
    })?;

    Ok(resource)
}

#[cfg(test)]
mod tests {
    use stayhub_core::{Entity, UserId};

    use super::*;
    use crate::DenialKind;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u32,
        owner: Option<UserId>,
    }

    impl Entity for Note {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl Owned for Note {
        fn owner_id(&self) -> Option<&UserId> {
            self.owner.as_ref()
        }
    }

    #[test]
    fn missing_resource_is_not_found_before_ownership() {
        let stranger = IdentityContext::new(UserId::new(), Some(Role::User));
        let err = guard::<Note>(&stranger, None, OwnerPolicy::OwnerOnly).unwrap_err();
        assert_eq!(err, GuardError::NotFound);
    }

    #[test]
    fn owner_passes_and_gets_resource_back() {
        let me = UserId::new();
        let identity = IdentityContext::new(me, Some(Role::User));
        let note = Note { id: 1, owner: Some(me) };

        assert_eq!(guard(&identity, Some(note.clone()), OwnerPolicy::OwnerOnly), Ok(note));
    }

    #[test]
    fn stranger_is_denied() {
        let identity = IdentityContext::new(UserId::new(), Some(Role::User));
        let note = Note { id: 1, owner: Some(UserId::new()) };

        let err = guard(&identity, Some(note), OwnerPolicy::OwnerOr(Role::Admin)).unwrap_err();
        assert!(matches!(
            err,
            GuardError::Authz(AuthzError::Denied { kind: DenialKind::NotOwner, .. })
        ));
    }

    #[test]
    fn admin_override_only_when_policy_allows_it() {
        let admin = IdentityContext::new(UserId::new(), Some(Role::Admin));
        let note = Note { id: 1, owner: Some(UserId::new()) };

        assert!(guard(&admin, Some(note.clone()), OwnerPolicy::OwnerOnly).is_err());
        assert!(guard(&admin, Some(note), OwnerPolicy::OwnerOr(Role::Admin)).is_ok());
    }

    #[test]
    fn ownerless_resource_is_denied_even_for_its_creator() {
        let identity = IdentityContext::new(UserId::new(), Some(Role::User));
        let note = Note { id: 1, owner: None };

        let err = guard(&identity, Some(note), OwnerPolicy::OwnerOnly).unwrap_err();
        assert!(matches!(
            err,
            GuardError::Authz(AuthzError::Denied { kind: DenialKind::NoOwner, .. })
        ));
    }
}
