use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::services::auth::store::{CredentialStore, StoreError, UserRecord};

/// Resolved identity for one request.
///
/// Built fresh from the credential store on every authentication attempt;
/// never cached across requests.
#[derive(Clone)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn from_record(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            password_hash: record.password_hash,
            roles: record.roles,
        }
    }

    /// Canonical authority strings derived from the stored role names.
    /// An empty role set yields an empty authority set.
    pub fn authorities(&self) -> Vec<String> {
        self.roles.iter().map(|r| canonical_authority(r)).collect()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish()
    }
}

/// Map a stored role name to its canonical authority form.
///
/// Total and idempotent: bare names gain the `ROLE_` prefix, already-prefixed
/// names pass through unchanged.
pub fn canonical_authority(role: &str) -> String {
    if role.starts_with("ROLE_") {
        role.to_string()
    } else {
        format!("ROLE_{role}")
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no user found with that username")]
    NotFound,

    #[error("credential store unavailable")]
    Store(#[source] StoreError),
}

/// Loads principals from the credential store and projects stored roles into
/// canonical authorities.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn load_by_username(&self, username: &str) -> Result<Principal, IdentityError> {
        let record = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "credential store lookup failed");
                IdentityError::Store(e)
            })?
            .ok_or(IdentityError::NotFound)?;

        Ok(Principal::from_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_authority_prefixes_bare_role_names() {
        assert_eq!(canonical_authority("ADMIN"), "ROLE_ADMIN");
        assert_eq!(canonical_authority("USER"), "ROLE_USER");
    }

    #[test]
    fn canonical_authority_is_idempotent() {
        assert_eq!(canonical_authority("ROLE_ADMIN"), "ROLE_ADMIN");
        assert_eq!(
            canonical_authority(&canonical_authority("ADMIN")),
            "ROLE_ADMIN"
        );
    }

    #[test]
    fn canonical_authority_is_total() {
        // No role name is rejected; even odd inputs map to something.
        assert_eq!(canonical_authority(""), "ROLE_");
        assert_eq!(canonical_authority("role_admin"), "ROLE_role_admin");
    }

    #[test]
    fn principal_authorities_follow_roles() {
        let p = Principal {
            id: 1,
            username: "alice".into(),
            password_hash: "x".into(),
            roles: vec!["USER".into(), "ROLE_ADMIN".into()],
        };
        assert_eq!(p.authorities(), vec!["ROLE_USER", "ROLE_ADMIN"]);

        let empty = Principal {
            id: 2,
            username: "bob".into(),
            password_hash: "x".into(),
            roles: vec![],
        };
        assert!(empty.authorities().is_empty());
    }

    #[test]
    fn principal_debug_hides_password_hash() {
        let p = Principal {
            id: 1,
            username: "alice".into(),
            password_hash: "secret-hash".into(),
            roles: vec!["USER".into()],
        };
        let rendered = format!("{p:?}");
        assert!(!rendered.contains("secret-hash"));
        assert!(rendered.contains("alice"));
    }
}
