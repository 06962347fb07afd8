/*
 * Responsibility
 * - SQLx operations for the reviews table
 * - Every mutation recomputes the movie's average_rating in the same
 *   transaction, so readers never see the two out of sync
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// One review per (user, movie); a second insert maps to `Conflict`.
pub async fn create(
    db: &PgPool,
    user_id: i64,
    movie_id: i64,
    rating: i32,
    comment: &str,
) -> Result<ReviewRow, RepoError> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        INSERT INTO reviews (user_id, movie_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, movie_id, rating, comment, created_at
        "#,
    )
    .bind(user_id)
    .bind(movie_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(&mut *tx)
    .await
    .map_err(RepoError::from_sqlx)?;

    recalc_average(&mut tx, movie_id).await?;
    tx.commit().await?;

    Ok(row)
}

pub async fn update(
    db: &PgPool,
    review_id: i64,
    rating: i32,
    comment: &str,
) -> Result<Option<ReviewRow>, RepoError> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        UPDATE reviews
        SET rating = $2, comment = $3
        WHERE id = $1
        RETURNING id, user_id, movie_id, rating, comment, created_at
        "#,
    )
    .bind(review_id)
    .bind(rating)
    .bind(comment)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(row) = &row {
        recalc_average(&mut tx, row.movie_id).await?;
    }
    tx.commit().await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, review_id: i64) -> Result<bool, RepoError> {
    let mut tx = db.begin().await?;

    let movie_id = sqlx::query_scalar::<_, i64>(
        r#"
        DELETE FROM reviews
        WHERE id = $1
        RETURNING movie_id
        "#,
    )
    .bind(review_id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(movie_id) = movie_id {
        recalc_average(&mut tx, movie_id).await?;
    }
    tx.commit().await?;

    Ok(movie_id.is_some())
}

/// Filters combine as AND; callers pass at least one.
pub async fn list(
    db: &PgPool,
    movie_id: Option<i64>,
    user_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReviewRow>, RepoError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT id, user_id, movie_id, rating, comment, created_at
        FROM reviews
        WHERE ($1::bigint IS NULL OR movie_id = $1)
          AND ($2::bigint IS NULL OR user_id = $2)
        ORDER BY id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(movie_id)
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn count(
    db: &PgPool,
    movie_id: Option<i64>,
    user_id: Option<i64>,
) -> Result<i64, RepoError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM reviews
        WHERE ($1::bigint IS NULL OR movie_id = $1)
          AND ($2::bigint IS NULL OR user_id = $2)
        "#,
    )
    .bind(movie_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(total)
}

async fn recalc_average(
    tx: &mut Transaction<'_, Postgres>,
    movie_id: i64,
) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        UPDATE movies
        SET average_rating = COALESCE(
            (SELECT AVG(rating)::float8 FROM reviews WHERE movie_id = $1),
            0
        )
        WHERE id = $1
        "#,
    )
    .bind(movie_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
