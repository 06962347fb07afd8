use std::sync::Arc;

use thiserror::Error;

use crate::services::auth::identity::{IdentityError, IdentityService, Principal};
use crate::services::auth::password;
use crate::services::auth::store::{CredentialStore, StoreError};

/// Role granted to every newly registered account.
const DEFAULT_ROLE: &str = "USER";

#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown username or wrong password. One variant for both, so callers
    /// cannot tell which half failed.
    #[error("invalid username or password")]
    BadCredentials,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("failed to hash password")]
    Hash(#[from] password_hash::Error),

    #[error("credential store unavailable")]
    Store(#[source] StoreError),
}

/// Password login and account registration.
///
/// Login timing is flattened against username probing: the unknown-user path
/// verifies the supplied password against a throwaway hash so it costs the
/// same as a real mismatch.
#[derive(Clone)]
pub struct CredentialService {
    identity: IdentityService,
    store: Arc<dyn CredentialStore>,
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(
        identity: IdentityService,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, password_hash::Error> {
        let dummy_hash = password::hash_password("throwaway-timing-pad")?;
        Ok(Self {
            identity,
            store,
            dummy_hash,
        })
    }

    /// Check a username/password pair and return the matching principal.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, CredentialError> {
        let principal = match self.identity.load_by_username(username).await {
            Ok(principal) => principal,
            Err(IdentityError::NotFound) => {
                let _ = password::verify_password(password, &self.dummy_hash);
                return Err(CredentialError::BadCredentials);
            }
            Err(IdentityError::Store(e)) => return Err(CredentialError::Store(e)),
        };

        if !password::verify_password(password, &principal.password_hash) {
            return Err(CredentialError::BadCredentials);
        }

        Ok(principal)
    }

    /// Create an account with the default role set and return its principal.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, CredentialError> {
        let password_hash = password::hash_password(password)?;
        let roles = vec![DEFAULT_ROLE.to_string()];

        match self.store.create(username, &password_hash, &roles).await {
            Ok(record) => Ok(Principal::from_record(record)),
            Err(StoreError::DuplicateUsername) => Err(CredentialError::UsernameTaken),
            Err(e) => Err(CredentialError::Store(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::services::auth::store::UserRecord;

    #[derive(Default)]
    struct MemStore {
        users: Mutex<HashMap<String, UserRecord>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl CredentialStore for MemStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Db(sqlx::Error::PoolClosed));
            }
            Ok(self.users.lock().unwrap().get(username).cloned())
        }

        async fn create(
            &self,
            username: &str,
            password_hash: &str,
            roles: &[String],
        ) -> Result<UserRecord, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(username) {
                return Err(StoreError::DuplicateUsername);
            }
            let record = UserRecord {
                id: users.len() as i64 + 1,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                roles: roles.to_vec(),
            };
            users.insert(username.to_string(), record.clone());
            Ok(record)
        }
    }

    fn service() -> (CredentialService, Arc<MemStore>) {
        let store = Arc::new(MemStore::default());
        let identity = IdentityService::new(store.clone());
        let creds = CredentialService::new(identity, store.clone()).unwrap();
        (creds, store)
    }

    #[tokio::test]
    async fn register_assigns_the_default_role() {
        let (creds, _) = service();

        let principal = creds.register("alice", "hunter2").await.unwrap();
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.roles, vec!["USER".to_string()]);
        assert_ne!(principal.password_hash, "hunter2");
    }

    #[tokio::test]
    async fn register_rejects_a_taken_username() {
        let (creds, _) = service();

        creds.register("alice", "hunter2").await.unwrap();
        let err = creds.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken));
    }

    #[tokio::test]
    async fn authenticate_accepts_the_registered_password() {
        let (creds, _) = service();

        creds.register("alice", "hunter2").await.unwrap();
        let principal = creds.authenticate("alice", "hunter2").await.unwrap();
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let (creds, _) = service();
        creds.register("alice", "hunter2").await.unwrap();

        let wrong = creds.authenticate("alice", "nope").await.unwrap_err();
        let unknown = creds.authenticate("mallory", "nope").await.unwrap_err();

        assert!(matches!(wrong, CredentialError::BadCredentials));
        assert!(matches!(unknown, CredentialError::BadCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn store_outage_is_not_reported_as_bad_credentials() {
        let (creds, store) = service();
        creds.register("alice", "hunter2").await.unwrap();
        store.fail.store(true, Ordering::SeqCst);

        let err = creds.authenticate("alice", "hunter2").await.unwrap_err();
        assert!(matches!(err, CredentialError::Store(_)));
    }
}
