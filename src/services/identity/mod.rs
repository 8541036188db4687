//! Caller identity resolution.
//!
//! Precedence, evaluated top to bottom on every call:
//! 1. the authenticated security principal (a malformed one fails closed)
//! 2. the reserved test token, when the bypass is enabled
//! 3. the bearer token, via the [`TokenProvider`](crate::services::token::TokenProvider)
//! 4. the detached defaults, when there is no request at all

mod resolver;
mod types;

pub use resolver::{IdentityError, IdentityResolver};
pub use types::{AuthenticatedUser, BypassPolicy, Principal, RequestSource, ResolvedIdentity};

/// Reserved bearer value recognized in place of a real token by test harnesses.
pub const TEST_BYPASS_TOKEN: &str = "test-token";

pub const DEFAULT_LOGIN_NAME: &str = "admin";
pub const DEFAULT_USER_ID: i64 = 1;
pub const DEFAULT_CLIENT_ID: i64 = 1;
