/*!
 * Security context extractor
 *
 * Responsibility:
 * - Hand the per-request security context (SecurityCtx) to handlers
 * - HTTP / axum plumbing lives in core; the type contract lives in types
 *
 * Public API:
 * - SecurityCtx
 * - SecurityContext
 * - CurrentUser
 */

mod core;
mod types;

pub use self::core::{CurrentUser, SecurityContext};
pub use types::SecurityCtx;
