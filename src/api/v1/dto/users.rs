/*
 * Responsibility
 * - Users response DTO (accounts are created via /auth/register)
 */
use serde::Serialize;

/// Role names are returned bare, as stored; the ROLE_ authority form stays
/// inside the security machinery.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub roles: Vec<String>,
}
