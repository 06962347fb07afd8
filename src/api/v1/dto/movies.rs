/*
 * Responsibility
 * - Movies request/response DTOs and the list filter
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::page::PageQuery;

#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub title: String,
    pub year: i32,
    pub poster_path: String,
    pub genres: Vec<String>,
}

impl MovieRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        if self.year <= 0 {
            return Err("year must be positive");
        }
        if self.poster_path.trim().is_empty() {
            return Err("poster_path is required");
        }
        if self.genres.iter().any(|g| g.trim().is_empty()) {
            return Err("genres cannot contain blank entries");
        }
        Ok(())
    }
}

/// Filters plus paging. Filters are mutually exclusive by priority
/// (title, then genre, then year); the handler applies that rule.
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl MovieListQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub poster_path: String,
    pub genres: Vec<String>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}
