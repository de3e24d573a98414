//! User profiles.
//!
//! Credentials live with the external identity provider; this is the
//! marketplace-side record (display name, contact email, last seen role).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stayhub_core::{DomainError, DomainResult, Entity, Owned, UserId};

use crate::{IdentityContext, Role};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a user may set on themselves.
///
/// Role and id are deliberately absent: both come from the verified identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// Create the profile for `identity` from a first update.
    pub fn create_profile(
        identity: &IdentityContext,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let mut errors = Vec::new();
        let name = match update.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                errors.push("Name is required".to_string());
                String::new()
            }
        };
        let email = match update.email.as_deref() {
            Some(e) => normalize_email(e).unwrap_or_else(|msg| {
                errors.push(msg);
                String::new()
            }),
            None => {
                errors.push("Email is required".to_string());
                String::new()
            }
        };
        DomainError::collect(errors)?;

        Ok(Self {
            id: identity.id(),
            name,
            email,
            role: identity.role().unwrap_or(Role::User),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update; `None` fields keep their current value.
    pub fn apply_profile(
        &mut self,
        identity: &IdentityContext,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut errors = Vec::new();

        let name = match update.name.as_deref().map(str::trim) {
            Some("") => {
                errors.push("Name cannot be empty".to_string());
                None
            }
            Some(n) => Some(n.to_string()),
            None => None,
        };
        let email = match update.email.as_deref().map(normalize_email) {
            Some(Ok(e)) => Some(e),
            Some(Err(msg)) => {
                errors.push(msg);
                None
            }
            None => None,
        };
        DomainError::collect(errors)?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(role) = identity.role() {
            self.role = role;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// A profile belongs to the user it describes.
impl Owned for User {
    fn owner_id(&self) -> Option<&UserId> {
        Some(&self.id)
    }
}

fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if valid {
        Ok(email)
    } else {
        Err("Please provide a valid email".to_string())
    }
}
