pub mod error;
pub mod movie_repo;
pub mod review_repo;
pub mod user_repo;
pub mod watchlist_repo;

pub use error::RepoError;
