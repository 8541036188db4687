use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::{AuthenticatedUser, BypassPolicy, Principal, RequestSource, ResolvedIdentity};
use super::{DEFAULT_CLIENT_ID, DEFAULT_LOGIN_NAME, DEFAULT_USER_ID, TEST_BYPASS_TOKEN};
use crate::services::token::{TokenError, TokenProvider};

#[derive(Debug, Error)]
pub enum IdentityError {
    /// A source claimed to know the caller but produced a blank identity.
    #[error("invalid identity: {0}")]
    InvalidIdentity(&'static str),

    /// The token provider refused the token; passed through unchanged.
    #[error(transparent)]
    Token(#[from] TokenError),
}

// The one source chosen for a single resolution.
enum Source<'a> {
    Principal(&'a AuthenticatedUser),
    Bypass,
    Token(&'a str),
    Detached,
}

impl Source<'_> {
    fn label(&self) -> &'static str {
        match self {
            Source::Principal(_) => "principal",
            Source::Bypass => "test_bypass",
            Source::Token(_) => "bearer_token",
            Source::Detached => "detached_default",
        }
    }
}

/// Resolves login name, user id and client id for the current caller.
///
/// The three resolutions are independent: each call walks the precedence
/// chain again and nothing is cached between them.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<dyn TokenProvider>,
    bypass: BypassPolicy,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("bypass", &self.bypass)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(tokens: Arc<dyn TokenProvider>, bypass: BypassPolicy) -> Self {
        Self { tokens, bypass }
    }

    pub fn bypass(&self) -> BypassPolicy {
        self.bypass
    }

    pub fn resolve_login_name(
        &self,
        principal: &Principal,
        request: &RequestSource,
    ) -> Result<String, IdentityError> {
        let source = self.select_source(principal, request)?;
        debug!(source = source.label(), "resolving login name");

        match source {
            Source::Principal(user) => Ok(user.login_name.clone()),
            Source::Bypass | Source::Detached => Ok(DEFAULT_LOGIN_NAME.to_string()),
            Source::Token(token) => {
                let name = self.tokens.username_from_token(token)?;
                if name.trim().is_empty() {
                    return Err(IdentityError::InvalidIdentity(
                        "token carries a blank login name",
                    ));
                }
                Ok(name)
            }
        }
    }

    pub fn resolve_user_id(
        &self,
        principal: &Principal,
        request: &RequestSource,
    ) -> Result<i64, IdentityError> {
        let source = self.select_source(principal, request)?;
        debug!(source = source.label(), "resolving user id");

        match source {
            Source::Principal(user) => Ok(user.user_id),
            Source::Bypass | Source::Detached => Ok(DEFAULT_USER_ID),
            Source::Token(token) => Ok(self.tokens.user_id_from_token(token)?),
        }
    }

    pub fn resolve_client_id(
        &self,
        principal: &Principal,
        request: &RequestSource,
    ) -> Result<i64, IdentityError> {
        let source = self.select_source(principal, request)?;
        debug!(source = source.label(), "resolving client id");

        match source {
            Source::Principal(user) => Ok(user.client_id),
            Source::Bypass | Source::Detached => Ok(DEFAULT_CLIENT_ID),
            Source::Token(token) => Ok(self.tokens.client_id_from_token(token)?),
        }
    }

    /// All three fields, each resolved on its own.
    pub fn resolve(
        &self,
        principal: &Principal,
        request: &RequestSource,
    ) -> Result<ResolvedIdentity, IdentityError> {
        Ok(ResolvedIdentity {
            login_name: self.resolve_login_name(principal, request)?,
            user_id: self.resolve_user_id(principal, request)?,
            client_id: self.resolve_client_id(principal, request)?,
        })
    }

    fn select_source<'a>(
        &self,
        principal: &'a Principal,
        request: &'a RequestSource,
    ) -> Result<Source<'a>, IdentityError> {
        // A supplied principal always wins; a malformed one never falls through.
        if let Principal::Authenticated(user) = principal {
            if user.login_name.trim().is_empty() {
                warn!(user_id = user.user_id, "principal with blank login name");
                return Err(IdentityError::InvalidIdentity(
                    "principal has a blank login name",
                ));
            }
            return Ok(Source::Principal(user));
        }

        match request {
            RequestSource::Detached => Ok(Source::Detached),
            RequestSource::Http { authorization } => {
                let token = bearer_token(authorization.as_deref())?;
                if self.bypass.is_enabled() && token == TEST_BYPASS_TOKEN {
                    warn!("test bypass token accepted");
                    return Ok(Source::Bypass);
                }
                Ok(Source::Token(token))
            }
        }
    }
}

/// Extract `<token>` from `Bearer <token>`.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, IdentityError> {
    let header = header.ok_or(IdentityError::InvalidIdentity("no bearer token on request"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(IdentityError::InvalidIdentity("authorization is not a bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(IdentityError::InvalidIdentity("empty bearer token"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct StubTokens {
        username: &'static str,
        user_id: i64,
        client_id: i64,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubTokens {
        fn new(username: &'static str, user_id: i64, client_id: i64) -> Self {
            Self {
                username,
                user_id,
                client_id,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new("", 0, 0)
            }
        }

        fn check(&self) -> Result<(), TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TokenError::InvalidClaim("signature"))
            } else {
                Ok(())
            }
        }
    }

    impl TokenProvider for StubTokens {
        fn username_from_token(&self, _token: &str) -> Result<String, TokenError> {
            self.check()?;
            Ok(self.username.to_string())
        }

        fn user_id_from_token(&self, _token: &str) -> Result<i64, TokenError> {
            self.check()?;
            Ok(self.user_id)
        }

        fn client_id_from_token(&self, _token: &str) -> Result<i64, TokenError> {
            self.check()?;
            Ok(self.client_id)
        }
    }

    fn resolver(tokens: Arc<StubTokens>, bypass: BypassPolicy) -> IdentityResolver {
        IdentityResolver::new(tokens, bypass)
    }

    #[test]
    fn principal_wins_over_bearer_header() {
        let tokens = Arc::new(StubTokens::new("token-user", 99, 99));
        let r = resolver(tokens.clone(), BypassPolicy::Enabled);
        let principal = Principal::authenticated("alice", 5, 12);

        for request in [
            RequestSource::bearer("real.jwt.value"),
            RequestSource::bearer(TEST_BYPASS_TOKEN),
            RequestSource::Detached,
        ] {
            let id = r.resolve(&principal, &request).unwrap();
            assert_eq!(
                id,
                ResolvedIdentity {
                    login_name: "alice".to_string(),
                    user_id: 5,
                    client_id: 12,
                }
            );
        }
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn blank_principal_fails_closed() {
        let tokens = Arc::new(StubTokens::new("token-user", 99, 99));
        let r = resolver(tokens.clone(), BypassPolicy::Enabled);
        let request = RequestSource::bearer("valid.jwt.value");

        for login in ["", "   ", "\t"] {
            let principal = Principal::authenticated(login, 5, 12);
            assert!(matches!(
                r.resolve_login_name(&principal, &request),
                Err(IdentityError::InvalidIdentity(_))
            ));
            assert!(matches!(
                r.resolve_user_id(&principal, &request),
                Err(IdentityError::InvalidIdentity(_))
            ));
            assert!(matches!(
                r.resolve_client_id(&principal, &request),
                Err(IdentityError::InvalidIdentity(_))
            ));
        }
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_token_yields_fixed_triple_when_enabled() {
        let tokens = Arc::new(StubTokens::new("token-user", 99, 99));
        let r = resolver(tokens.clone(), BypassPolicy::Enabled);

        let id = r
            .resolve(&Principal::Absent, &RequestSource::bearer(TEST_BYPASS_TOKEN))
            .unwrap();

        assert_eq!(id.login_name, "admin");
        assert_eq!(id.user_id, 1);
        assert_eq!(id.client_id, 1);
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_token_is_an_ordinary_token_when_disabled() {
        let tokens = Arc::new(StubTokens::failing());
        let r = resolver(tokens.clone(), BypassPolicy::Disabled);

        let err = r
            .resolve_login_name(&Principal::Absent, &RequestSource::bearer(TEST_BYPASS_TOKEN))
            .unwrap_err();

        assert!(matches!(err, IdentityError::Token(_)));
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bearer_token_is_delegated_to_provider() {
        let tokens = Arc::new(StubTokens::new("bob@acme.test", 31, 4));
        let r = resolver(tokens.clone(), BypassPolicy::Enabled);

        let id = r
            .resolve(&Principal::Absent, &RequestSource::bearer("real.jwt.value"))
            .unwrap();

        assert_eq!(id.login_name, "bob@acme.test");
        assert_eq!(id.user_id, 31);
        assert_eq!(id.client_id, 4);
        // One provider call per field; nothing is cached.
        assert_eq!(tokens.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn blank_username_from_provider_is_invalid() {
        let tokens = Arc::new(StubTokens::new("  ", 31, 4));
        let r = resolver(tokens, BypassPolicy::Disabled);

        assert!(matches!(
            r.resolve_login_name(&Principal::Absent, &RequestSource::bearer("real.jwt.value")),
            Err(IdentityError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn provider_errors_propagate_unchanged() {
        let r = resolver(Arc::new(StubTokens::failing()), BypassPolicy::Disabled);
        let request = RequestSource::bearer("garbled");

        assert!(matches!(
            r.resolve_user_id(&Principal::Absent, &request),
            Err(IdentityError::Token(TokenError::InvalidClaim("signature")))
        ));
        assert!(matches!(
            r.resolve_client_id(&Principal::Absent, &request),
            Err(IdentityError::Token(_))
        ));
    }

    #[test]
    fn detached_execution_gets_defaults() {
        let r = resolver(Arc::new(StubTokens::failing()), BypassPolicy::Disabled);

        let id = r.resolve(&Principal::Absent, &RequestSource::Detached).unwrap();
        assert_eq!(id.login_name, DEFAULT_LOGIN_NAME);
        assert_eq!(id.user_id, DEFAULT_USER_ID);
        assert_eq!(id.client_id, DEFAULT_CLIENT_ID);
    }

    #[test]
    fn request_without_usable_bearer_is_invalid() {
        let r = resolver(Arc::new(StubTokens::new("x", 1, 1)), BypassPolicy::Enabled);

        let headers = [
            None,
            Some("Basic dXNlcjpwYXNz"),
            Some("Bearer "),
            Some("Bearer    "),
        ];
        for authorization in headers {
            let request = RequestSource::Http {
                authorization: authorization.map(str::to_string),
            };
            assert!(matches!(
                r.resolve_login_name(&Principal::Absent, &request),
                Err(IdentityError::InvalidIdentity(_))
            ));
        }
    }

    #[test]
    fn bearer_token_trims_surrounding_space() {
        assert_eq!(bearer_token(Some("Bearer  abc ")).unwrap(), "abc");
    }
}
