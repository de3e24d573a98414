use stayhub_core::UserId;

use crate::{JwtClaims, Role, TokenValidationError};

/// Identity of the authenticated caller for one request.
///
/// Built once from verified claims and never mutated afterwards. The role is
/// `None` when the token carried no role, an empty one, or a name outside the
/// known set; such an identity can pass ownership checks but no role check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    id: UserId,
    role: Option<Role>,
}

impl IdentityContext {
    pub fn new(id: UserId, role: Option<Role>) -> Self {
        Self { id, role }
    }

    pub fn from_claims(claims: &JwtClaims) -> Result<Self, TokenValidationError> {
        let id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenValidationError::InvalidSubject)?;
        let role = claims.role.as_deref().and_then(Role::parse);
        Ok(Self { id, role })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn claims(sub: &str, role: Option<&str>) -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: sub.to_string(),
            role: role.map(str::to_string),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
        }
    }

    #[test]
    fn unknown_and_empty_roles_become_none() {
        let id = UserId::new().to_string();
        for raw in [None, Some(""), Some("superuser"), Some("ADMIN")] {
            let identity = IdentityContext::from_claims(&claims(&id, raw)).unwrap();
            assert_eq!(identity.role(), None, "role claim {raw:?}");
        }
    }

    #[test]
    fn subject_must_be_a_user_id() {
        let err = IdentityContext::from_claims(&claims("bob", Some("user"))).unwrap_err();
        assert_eq!(err, TokenValidationError::InvalidSubject);
    }
}
