/*
 * Responsibility
 * - SQLx operations for watchlist_items
 * - Rows are returned joined with the movie title for the API shape
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct WatchlistRow {
    pub id: i64,
    pub movie_id: i64,
    pub title: String,
    pub added_at: DateTime<Utc>,
}

/// Idempotent: adding a movie already on the list returns the existing row.
pub async fn add(db: &PgPool, user_id: i64, movie_id: i64) -> Result<WatchlistRow, RepoError> {
    let row = sqlx::query_as::<_, WatchlistRow>(
        r#"
        WITH item AS (
            INSERT INTO watchlist_items (user_id, movie_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, movie_id)
                DO UPDATE SET movie_id = EXCLUDED.movie_id
            RETURNING id, movie_id, added_at
        )
        SELECT item.id, item.movie_id, m.title, item.added_at
        FROM item
        JOIN movies m ON m.id = item.movie_id
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn remove(db: &PgPool, user_id: i64, movie_id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query(
        r#"
        DELETE FROM watchlist_items
        WHERE user_id = $1 AND movie_id = $2
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list(
    db: &PgPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<WatchlistRow>, RepoError> {
    let rows = sqlx::query_as::<_, WatchlistRow>(
        r#"
        SELECT w.id, w.movie_id, m.title, w.added_at
        FROM watchlist_items w
        JOIN movies m ON m.id = w.movie_id
        WHERE w.user_id = $1
        ORDER BY w.added_at DESC, w.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn count(db: &PgPool, user_id: i64) -> Result<i64, RepoError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM watchlist_items
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(total)
}
