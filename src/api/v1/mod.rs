/*
 * Responsibility
 * - v1 public surface (routes() re-export and the shared dto/extractor mods)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
