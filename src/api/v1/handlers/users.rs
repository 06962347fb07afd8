/*
 * Responsibility
 * - /users lookup handler
 * - Accounts are created via /auth/register, so there is no create here
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{api::v1::dto::users::UserResponse, error::AppError, repos::user_repo, state::AppState};

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(UserResponse {
        id: row.id,
        username: row.username,
        roles: row.roles,
    }))
}
