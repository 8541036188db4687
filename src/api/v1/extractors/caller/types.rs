use std::sync::Arc;

use crate::services::identity::{
    IdentityError, IdentityResolver, Principal, RequestSource, ResolvedIdentity,
};

/// The inputs needed to resolve who is calling, captured from one request.
///
/// Nothing is resolved until a handler asks; each accessor walks the
/// precedence chain on its own.
#[derive(Debug, Clone)]
pub struct Caller {
    principal: Principal,
    request: RequestSource,
    resolver: Arc<IdentityResolver>,
}

impl Caller {
    pub fn new(
        principal: Principal,
        request: RequestSource,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            principal,
            request,
            resolver,
        }
    }

    pub fn login_name(&self) -> Result<String, IdentityError> {
        self.resolver.resolve_login_name(&self.principal, &self.request)
    }

    pub fn user_id(&self) -> Result<i64, IdentityError> {
        self.resolver.resolve_user_id(&self.principal, &self.request)
    }

    pub fn client_id(&self) -> Result<i64, IdentityError> {
        self.resolver.resolve_client_id(&self.principal, &self.request)
    }

    pub fn resolve(&self) -> Result<ResolvedIdentity, IdentityError> {
        self.resolver.resolve(&self.principal, &self.request)
    }
}
