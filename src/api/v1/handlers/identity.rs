/*
 * Responsibility
 * - GET /identity: who is calling (login name, user id, client id)
 * - GET /clients/{client_id}/identity: same, scoped to one tenant
 * - GET /context: what the request context holds at this point
 */
use std::collections::HashMap;

use axum::{Extension, Json, extract::Path};

use crate::api::v1::dto::identity::IdentityResponse;
use crate::api::v1::extractors::Caller;
use crate::context::{self, RequestContext, keys};
use crate::error::AppError;

pub async fn whoami(caller: Caller) -> Result<Json<IdentityResponse>, AppError> {
    let id = caller.resolve()?;

    // Later code in this request reads the identity from the context, not from the caller.
    context::set(keys::LOGIN_NAME, id.login_name.as_str());
    context::set(keys::USER_ID, id.user_id.to_string());
    context::set(keys::CLIENT_ID, id.client_id.to_string());

    Ok(Json(id.into()))
}

pub async fn client_identity(
    Path(client_id): Path<i64>,
    caller: Caller,
) -> Result<Json<IdentityResponse>, AppError> {
    if client_id <= 0 {
        return Err(AppError::bad_request(format!("invalid client id {client_id}")));
    }

    let own_client = caller.client_id()?;
    if own_client != client_id {
        return Err(AppError::permission_denied(format!(
            "client {client_id} is outside the caller's tenant"
        )));
    }

    let id = caller.resolve()?;
    context::set(keys::CLIENT_ID, own_client.to_string());
    Ok(Json(id.into()))
}

pub async fn context_snapshot(
    Extension(ctx): Extension<RequestContext>,
) -> Json<HashMap<String, String>> {
    Json(ctx.get_all())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::DEFAULT_ISSUER;
    use crate::services::identity::{BypassPolicy, IdentityResolver, Principal, RequestSource};
    use crate::services::token::JwtTokenProvider;

    fn caller(principal: Principal) -> Caller {
        let tokens = Arc::new(JwtTokenProvider::new(
            "handler-test-secret-handler-test",
            DEFAULT_ISSUER.to_string(),
            60,
            0,
        ));
        let resolver = Arc::new(IdentityResolver::new(tokens, BypassPolicy::Disabled));
        Caller::new(principal, RequestSource::Detached, resolver)
    }

    #[tokio::test]
    async fn whoami_leaves_the_identity_in_the_context() {
        let ctx = RequestContext::new();

        let (ok, login, user, client) = context::scope(ctx.clone(), async {
            let ok = whoami(caller(Principal::authenticated("carol", 8, 3)))
                .await
                .is_ok();
            (
                ok,
                context::get(keys::LOGIN_NAME),
                context::get(keys::USER_ID),
                context::get(keys::CLIENT_ID),
            )
        })
        .await;

        assert!(ok);
        assert_eq!(login.as_deref(), Some("carol"));
        assert_eq!(user.as_deref(), Some("8"));
        assert_eq!(client.as_deref(), Some("3"));
        assert!(ctx.get_all().is_empty());
    }

    #[tokio::test]
    async fn client_identity_records_only_the_callers_own_tenant() {
        let ctx = RequestContext::new();

        let (denied, after_denied, own, after_own) = context::scope(ctx.clone(), async {
            let carol = || caller(Principal::authenticated("carol", 8, 3));
            let denied = client_identity(Path(9), carol()).await.is_err();
            let after_denied = context::get(keys::CLIENT_ID);
            let own = client_identity(Path(3), carol()).await.is_ok();
            (denied, after_denied, own, context::get(keys::CLIENT_ID))
        })
        .await;

        assert!(denied);
        assert_eq!(after_denied, None);
        assert!(own);
        assert_eq!(after_own.as_deref(), Some("3"));
    }
}
