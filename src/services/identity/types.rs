/*
 * Responsibility
 * - the inputs of identity resolution (who the security layer says is calling,
 *   and what the inbound request carries)
 * - the resolved output handed to handlers
 */

/// A principal established by an upstream authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub login_name: String,
    pub user_id: i64,
    pub client_id: i64,
}

/// Security context for the current request.
///
/// Handlers read it from request extensions; a request without one is `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Principal {
    Authenticated(AuthenticatedUser),
    #[default]
    Absent,
}

impl Principal {
    pub fn authenticated(login_name: impl Into<String>, user_id: i64, client_id: i64) -> Self {
        Self::Authenticated(AuthenticatedUser {
            login_name: login_name.into(),
            user_id,
            client_id,
        })
    }
}

/// What is known about the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    /// An HTTP request, with its raw `Authorization` header if one was sent.
    Http { authorization: Option<String> },
    /// No request at all (background jobs, startup tasks).
    Detached,
}

impl RequestSource {
    pub fn bearer(token: &str) -> Self {
        Self::Http {
            authorization: Some(format!("Bearer {token}")),
        }
    }
}

/// Whether the reserved test token is honored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BypassPolicy {
    Enabled,
    #[default]
    Disabled,
}

impl BypassPolicy {
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub login_name: String,
    pub user_id: i64,
    pub client_id: i64,
}
