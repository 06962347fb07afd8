/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Held by Clone; every field is a pool handle or an Arc, so clones are
 *   cheap
 */
use std::sync::Arc;

use sqlx::PgPool;

use crate::services::auth::{AccessPolicy, CredentialService, IdentityService, TokenService};
use crate::services::files::FileStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenService>,
    pub identity: Arc<IdentityService>,
    pub credentials: Arc<CredentialService>,
    pub policy: Arc<AccessPolicy>,
    pub files: Arc<FileStore>,
    /// Path prefixes the authentication stage skips token processing for.
    pub auth_exempt: Arc<Vec<String>>,
}
