/*
 * Responsibility
 * - Reviews request/response DTOs
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::page::PageQuery;

fn validate_rating_and_comment(rating: i32, comment: &str) -> Result<(), &'static str> {
    if !(1..=5).contains(&rating) {
        return Err("rating must be between 1 and 5");
    }
    if comment.trim().is_empty() {
        return Err("comment is required");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
}

impl ReviewRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_rating_and_comment(self.rating, &self.comment)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewUpdateRequest {
    pub rating: i32,
    pub comment: String,
}

impl ReviewUpdateRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_rating_and_comment(self.rating, &self.comment)
    }
}

/// Listing requires at least one of movie_id / user_id; the handler
/// rejects fully unfiltered queries.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub movie_id: Option<i64>,
    pub user_id: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl ReviewListQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
