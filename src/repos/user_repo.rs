/*
 * Responsibility
 * - SQLx operations for the users table
 * - Adapts the pool to the CredentialStore port used by services/auth
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::auth::store::{CredentialStore, StoreError, UserRecord};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            roles: row.roles,
        }
    }
}

pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password_hash, roles
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    username: &str,
    password_hash: &str,
    roles: &[String],
) -> Result<UserRow, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, password_hash, roles)
        VALUES ($1, $2, $3)
        RETURNING id, username, password_hash, roles
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(roles)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn get(db: &PgPool, user_id: i64) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, username, password_hash, roles
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Postgres-backed credential store.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn store_error(e: RepoError) -> StoreError {
    match e {
        RepoError::Conflict => StoreError::DuplicateUsername,
        RepoError::Db(e) => StoreError::Db(e),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = find_by_username(&self.db, username)
            .await
            .map_err(store_error)?;
        Ok(row.map(UserRecord::from))
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[String],
    ) -> Result<UserRecord, StoreError> {
        let row = create(&self.db, username, password_hash, roles)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }
}
