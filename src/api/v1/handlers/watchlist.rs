/*
 * Responsibility
 * - /watchlist handlers, always scoped to the authenticated caller
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::dto::page::{PageQuery, PageResponse},
    api::v1::dto::watchlist::{WatchlistAddQuery, WatchlistResponse},
    api::v1::extractors::security_ctx::CurrentUser,
    error::AppError,
    repos::{movie_repo, watchlist_repo},
    state::AppState,
};

fn watchlist_response(row: watchlist_repo::WatchlistRow) -> WatchlistResponse {
    WatchlistResponse {
        id: row.id,
        movie_id: row.movie_id,
        title: row.title,
        added_at: row.added_at,
    }
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<WatchlistAddQuery>,
) -> Result<(StatusCode, Json<WatchlistResponse>), AppError> {
    if movie_repo::get(&state.db, query.movie_id).await?.is_none() {
        return Err(AppError::NotFound("movie"));
    }

    let row = watchlist_repo::add(&state.db, user.id, query.movie_id).await?;

    Ok((StatusCode::CREATED, Json(watchlist_response(row))))
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let removed = watchlist_repo::remove(&state.db, user.id, movie_id).await?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("watchlist item"))
    }
}

pub async fn list_watchlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(paging): Query<PageQuery>,
) -> Result<Json<PageResponse<WatchlistResponse>>, AppError> {
    let rows = watchlist_repo::list(&state.db, user.id, paging.limit(), paging.offset()).await?;
    let total = watchlist_repo::count(&state.db, user.id).await?;

    let items = rows.into_iter().map(watchlist_response).collect();
    Ok(Json(PageResponse::new(items, &paging, total)))
}
