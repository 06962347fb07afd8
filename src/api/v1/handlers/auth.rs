/*
 * Responsibility
 * - POST /auth/login and POST /auth/register
 * - Both sit under the exempt prefix, so they are reachable anonymously
 */
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::v1::dto::auth::{LoginRequest, RegisterRequest, TokenResponse};
use crate::api::v1::dto::users::UserResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    let principal = state
        .credentials
        .authenticate(&req.username, &req.password)
        .await?;
    let token = state.tokens.issue(&principal)?;

    Ok(Json(TokenResponse { token }))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    let principal = state
        .credentials
        .register(&req.username, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: principal.id,
            username: principal.username,
            roles: principal.roles,
        }),
    ))
}
