/*
 * Responsibility
 * - Config load → dependency construction → Router assembly
 * - Middleware application (auth pipeline, CORS, HTTP infra)
 * - Startup via axum::serve()
 */
use std::sync::Arc;
use std::{panic, process};

use anyhow::Result;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::user_repo::PgCredentialStore;
use crate::services::auth::{
    Access, AccessPolicy, AccessRule, CredentialService, IdentityService, TokenService,
};
use crate::services::files::FileStore;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost when stderr is
        // hidden by the process supervisor.
        tracing::error!(?info, "panic");

        // In development, fail fast. In production, keep the server running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let abort_on_panic = !config.app_env.is_production();
    init_panic_hook(abort_on_panic);

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// The route access table. First match wins; anything unmatched requires
/// authentication, so new routes are protected by default.
pub fn access_policy() -> AccessPolicy {
    AccessPolicy::new(vec![
        AccessRule::path("/api/v1/auth/**", Access::Public),
        AccessRule::get("/health", Access::Public),
        AccessRule::get("/api/v1/movies/**", Access::Public),
        AccessRule::get("/api/v1/reviews/**", Access::Public),
        AccessRule::post("/api/v1/movies/**", Access::Role("ADMIN")),
        AccessRule::put("/api/v1/movies/**", Access::Role("ADMIN")),
        AccessRule::delete("/api/v1/movies/**", Access::Role("ADMIN")),
        AccessRule::post("/api/v1/files/upload", Access::Role("ADMIN")),
        AccessRule::get("/api/v1/files/**", Access::Authenticated),
        AccessRule::path("/api/v1/reviews/**", Access::Authenticated),
        AccessRule::path("/api/v1/watchlist/**", Access::Authenticated),
        AccessRule::path("/api/v1/users/**", Access::Authenticated),
    ])
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&db).await?;

    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret_base64,
        config.jwt_ttl_seconds,
    )?);
    let store = Arc::new(PgCredentialStore::new(db.clone()));
    let identity = IdentityService::new(store.clone());
    let credentials = Arc::new(CredentialService::new(identity.clone(), store)?);
    let files = Arc::new(FileStore::init(config.upload_dir.clone()).await?);

    Ok(AppState {
        db,
        tokens,
        identity: Arc::new(identity),
        credentials,
        policy: Arc::new(access_policy()),
        files,
        auth_exempt: Arc::new(config.auth_exempt_prefixes.clone()),
    })
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes());

    let router = middleware::auth::apply(router, state.clone()).with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}
