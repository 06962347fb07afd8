pub mod auth;
pub mod movies;
pub mod page;
pub mod reviews;
pub mod users;
pub mod watchlist;
