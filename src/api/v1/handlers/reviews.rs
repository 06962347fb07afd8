/*
 * Responsibility
 * - /reviews CRUD handlers
 * - Creation 404s on unknown user/movie before touching the reviews table
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::dto::page::PageResponse,
    api::v1::dto::reviews::{ReviewListQuery, ReviewRequest, ReviewResponse, ReviewUpdateRequest},
    error::AppError,
    repos::{RepoError, movie_repo, review_repo, user_repo},
    state::AppState,
};

fn review_response(row: review_repo::ReviewRow) -> ReviewResponse {
    ReviewResponse {
        id: row.id,
        user_id: row.user_id,
        movie_id: row.movie_id,
        rating: row.rating,
        comment: row.comment,
        created_at: row.created_at,
    }
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    if user_repo::get(&state.db, req.user_id).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }
    if movie_repo::get(&state.db, req.movie_id).await?.is_none() {
        return Err(AppError::NotFound("movie"));
    }

    let row = review_repo::create(&state.db, req.user_id, req.movie_id, req.rating, &req.comment)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::Conflict("user has already reviewed this movie"),
            e => e.into(),
        })?;

    Ok((StatusCode::CREATED, Json(review_response(row))))
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<PageResponse<ReviewResponse>>, AppError> {
    // movie_id wins when both filters are present.
    let (movie_id, user_id) = match (query.movie_id, query.user_id) {
        (Some(m), _) => (Some(m), None),
        (None, Some(u)) => (None, Some(u)),
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "movie_id or user_id is required".into(),
            ));
        }
    };

    let paging = query.paging();
    let rows = review_repo::list(
        &state.db,
        movie_id,
        user_id,
        paging.limit(),
        paging.offset(),
    )
    .await?;
    let total = review_repo::count(&state.db, movie_id, user_id).await?;

    let items = rows.into_iter().map(review_response).collect();
    Ok(Json(PageResponse::new(items, &paging, total)))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(req): Json<ReviewUpdateRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    let row = review_repo::update(&state.db, review_id, req.rating, &req.comment)
        .await?
        .ok_or(AppError::NotFound("review"))?;

    Ok(Json(review_response(row)))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = review_repo::delete(&state.db, review_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("review"))
    }
}
