/*
 * Responsibility
 * - The v1 URL structure
 * - Which routes require which access level is decided in the access table
 *   (app::access_policy), not here; this file only wires paths to handlers
 */
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::middleware::http::BODY_LIMIT_BYTES;
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{login, register},
    files::{download_file, upload_file},
    movies::{create_movie, delete_movie, get_movie, list_movies, update_movie},
    reviews::{create_review, delete_review, list_reviews, update_review},
    users::get_user,
    watchlist::{add_to_watchlist, list_watchlist, remove_from_watchlist},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/{user_id}", get(get_user))
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/{movie_id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .route("/reviews", get(list_reviews).post(create_review))
        .route(
            "/reviews/{review_id}",
            put(update_review).delete(delete_review),
        )
        .route("/watchlist", get(list_watchlist).post(add_to_watchlist))
        .route(
            "/watchlist/{movie_id}",
            delete(remove_from_watchlist),
        )
        .route(
            "/files/upload",
            post(upload_file).layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
        )
        .route("/files/{file_name}", get(download_file))
}
