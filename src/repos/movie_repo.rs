/*
 * Responsibility
 * - SQLx operations for the movies table
 * - average_rating is owned by review_repo; it is only read here
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub poster_path: String,
    pub genres: Vec<String>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Optional filters combine as AND; a `None` filter matches everything.
pub async fn list(
    db: &PgPool,
    title: Option<&str>,
    genre: Option<&str>,
    year: Option<i32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<MovieRow>, RepoError> {
    let rows = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT id, title, year, poster_path, genres, average_rating, created_at
        FROM movies
        WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR $2 = ANY(genres))
          AND ($3::int  IS NULL OR year = $3)
        ORDER BY id
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(title)
    .bind(genre)
    .bind(year)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn count(
    db: &PgPool,
    title: Option<&str>,
    genre: Option<&str>,
    year: Option<i32>,
) -> Result<i64, RepoError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM movies
        WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR $2 = ANY(genres))
          AND ($3::int  IS NULL OR year = $3)
        "#,
    )
    .bind(title)
    .bind(genre)
    .bind(year)
    .fetch_one(db)
    .await?;

    Ok(total)
}

pub async fn get(db: &PgPool, movie_id: i64) -> Result<Option<MovieRow>, RepoError> {
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        SELECT id, title, year, poster_path, genres, average_rating, created_at
        FROM movies
        WHERE id = $1
        "#,
    )
    .bind(movie_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    title: &str,
    year: i32,
    poster_path: &str,
    genres: &[String],
) -> Result<MovieRow, RepoError> {
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        INSERT INTO movies (title, year, poster_path, genres)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, year, poster_path, genres, average_rating, created_at
        "#,
    )
    .bind(title)
    .bind(year)
    .bind(poster_path)
    .bind(genres)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// Full replace of the mutable fields.
pub async fn update(
    db: &PgPool,
    movie_id: i64,
    title: &str,
    year: i32,
    poster_path: &str,
    genres: &[String],
) -> Result<Option<MovieRow>, RepoError> {
    let row = sqlx::query_as::<_, MovieRow>(
        r#"
        UPDATE movies
        SET title = $2, year = $3, poster_path = $4, genres = $5
        WHERE id = $1
        RETURNING id, title, year, poster_path, genres, average_rating, created_at
        "#,
    )
    .bind(movie_id)
    .bind(title)
    .bind(year)
    .bind(poster_path)
    .bind(genres)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, movie_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM movies
        WHERE id = $1
        "#,
    )
    .bind(movie_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
