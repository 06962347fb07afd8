/*
 * Responsibility
 * - Watchlist request/response DTOs
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WatchlistAddQuery {
    pub movie_id: i64,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub id: i64,
    pub movie_id: i64,
    pub title: String,
    pub added_at: DateTime<Utc>,
}
