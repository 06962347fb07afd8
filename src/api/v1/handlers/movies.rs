/*
 * Responsibility
 * - /movies CRUD handlers
 * - Reads are public, writes require ADMIN (enforced by the access table,
 *   not here)
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    api::v1::dto::movies::{MovieListQuery, MovieRequest, MovieResponse},
    api::v1::dto::page::PageResponse,
    error::AppError,
    repos::movie_repo,
    state::AppState,
};

fn movie_response(row: movie_repo::MovieRow) -> MovieResponse {
    MovieResponse {
        id: row.id,
        title: row.title,
        year: row.year,
        poster_path: row.poster_path,
        genres: row.genres,
        average_rating: row.average_rating,
        created_at: row.created_at,
    }
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieListQuery>,
) -> Result<Json<PageResponse<MovieResponse>>, AppError> {
    // One filter at a time: title wins over genre, genre over year.
    let (title, genre, year) = match (&query.title, &query.genre, query.year) {
        (Some(t), _, _) => (Some(t.as_str()), None, None),
        (None, Some(g), _) => (None, Some(g.as_str()), None),
        (None, None, y) => (None, None, y),
    };

    let paging = query.paging();
    let rows = movie_repo::list(
        &state.db,
        title,
        genre,
        year,
        paging.limit(),
        paging.offset(),
    )
    .await?;
    let total = movie_repo::count(&state.db, title, genre, year).await?;

    let items = rows.into_iter().map(movie_response).collect();
    Ok(Json(PageResponse::new(items, &paging, total)))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<Json<MovieResponse>, AppError> {
    let row = movie_repo::get(&state.db, movie_id)
        .await?
        .ok_or(AppError::NotFound("movie"))?;

    Ok(Json(movie_response(row)))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Json(req): Json<MovieRequest>,
) -> Result<(StatusCode, Json<MovieResponse>), AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    let row = movie_repo::create(&state.db, &req.title, req.year, &req.poster_path, &req.genres)
        .await?;

    Ok((StatusCode::CREATED, Json(movie_response(row))))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Json(req): Json<MovieRequest>,
) -> Result<Json<MovieResponse>, AppError> {
    req.validate().map_err(|m| AppError::InvalidRequest(m.into()))?;

    let row = movie_repo::update(
        &state.db,
        movie_id,
        &req.title,
        req.year,
        &req.poster_path,
        &req.genres,
    )
    .await?
    .ok_or(AppError::NotFound("movie"))?;

    Ok(Json(movie_response(row)))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = movie_repo::delete(&state.db, movie_id).await?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("movie"))
    }
}
