//! Bearer token verification → SecurityCtx in extensions → route authorization.
//!
//! Two layers wrap the API router:
//! - `authenticate` resolves every request to a `SecurityCtx` and stores it
//!   in the request extensions. It never rejects on token problems; those
//!   downgrade to `Anonymous` so the authorization stage owns the outcome.
//! - `authorize` asks the access policy and maps denials to 401/403.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::security_ctx::SecurityCtx;
use crate::error::AppError;
use crate::services::auth::identity::IdentityError;
use crate::services::auth::policy::{Decision, DenyReason};
use crate::state::AppState;

/// Apply the authentication and authorization layers.
///
/// Example:
/// ```ignore
/// let app = middleware::auth::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // The layer added last runs first, so authorize goes on before
    // authenticate: every request is authenticated, then authorized.
    router
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .layer(middleware::from_fn_with_state(state, authenticate))
}

async fn authenticate(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // A context set by an earlier layer is left untouched.
    if req.extensions().get::<SecurityCtx>().is_none() {
        let ctx = resolve_context(&state, original_uri.path(), req.headers()).await?;
        req.extensions_mut().insert(ctx);
    }

    Ok(next.run(req).await)
}

/// Resolve the caller's identity for this request.
///
/// Exempt prefixes skip token processing entirely. Invalid tokens and
/// tokens for since-deleted users become `Anonymous`; only a credential
/// store outage is a hard error, so infrastructure failures are never
/// reported as authentication outcomes.
async fn resolve_context(
    state: &AppState,
    path: &str,
    headers: &HeaderMap,
) -> Result<SecurityCtx, AppError> {
    if state
        .auth_exempt
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return Ok(SecurityCtx::Anonymous);
    }

    let Some(token) = bearer_token(headers) else {
        return Ok(SecurityCtx::Anonymous);
    };

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(error = ?err, "access token rejected");
            return Ok(SecurityCtx::Anonymous);
        }
    };

    match state.identity.load_by_username(&claims.sub).await {
        Ok(principal) => {
            // Binds the token to the record the store actually returned.
            if state.tokens.validate(token, &principal) {
                Ok(SecurityCtx::authenticated(principal))
            } else {
                tracing::warn!(subject = %claims.sub, "token does not match the resolved principal");
                Ok(SecurityCtx::Anonymous)
            }
        }
        Err(IdentityError::NotFound) => {
            tracing::warn!(subject = %claims.sub, "token subject no longer exists");
            Ok(SecurityCtx::Anonymous)
        }
        Err(IdentityError::Store(_)) => Err(AppError::Internal),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn authorize(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decision = {
        let ctx = req
            .extensions()
            .get::<SecurityCtx>()
            .ok_or(AppError::Internal)?;
        state.policy.decide(req.method(), original_uri.path(), ctx)
    };

    match decision {
        Decision::Allow => Ok(next.run(req).await),
        Decision::Deny(DenyReason::Unauthenticated) => Err(AppError::Unauthorized),
        Decision::Deny(DenyReason::Forbidden) => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.remove(header::AUTHORIZATION);
        assert_eq!(bearer_token(&headers), None);
    }
}
