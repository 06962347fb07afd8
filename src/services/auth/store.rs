use async_trait::async_trait;

/// Persistence shape of one credential record.
///
/// `roles` holds raw role names as stored (e.g. "USER", "ADMIN"); canonical
/// authority strings are derived later, when a `Principal` is built.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store error")]
    Db(#[from] sqlx::Error),

    #[error("username already exists")]
    DuplicateUsername,
}

/// Credential store lookup/insert seam.
///
/// Backed by Postgres in production; tests plug in an in-memory
/// implementation. A store failure is an infrastructure failure and must stay
/// distinguishable from "no such user" (`Ok(None)`).
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> Result<UserRecord, StoreError>;
}
