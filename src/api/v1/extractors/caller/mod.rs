/*!
 * Caller extractor
 *
 * Responsibility:
 * - give handlers lazy access to the caller's identity
 * - axum dependencies stay in core; the type lives in types
 */

mod core;
mod types;

pub use types::Caller;
