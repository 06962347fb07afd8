use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::identity::Principal;
use crate::state::AppState;

use super::SecurityCtx;

/// Extractor handing the request's security context to a handler.
/// The authentication middleware inserts one for every request, so a missing
/// value means the middleware stack is miswired, not that the caller is
/// unauthenticated.
pub struct SecurityContext(pub SecurityCtx);

impl FromRequestParts<AppState> for SecurityContext
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityCtx>()
            .cloned()
            .map(SecurityContext)
            .ok_or(AppError::Internal)
    }
}

/// Extractor for handlers that need an authenticated caller.
/// Anonymous requests are rejected with 401.
pub struct CurrentUser(pub Principal);

impl FromRequestParts<AppState> for CurrentUser
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<SecurityCtx>()
            .ok_or(AppError::Internal)?;
        ctx.principal()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}
