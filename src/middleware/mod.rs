/*
 * Responsibility
 * - Router-level middleware (auth pipeline, CORS, HTTP infra, headers)
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
