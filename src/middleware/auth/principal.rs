//! Bearer token → `Principal` in request extensions.
//!
//! This is the security-context layer: when the bearer token verifies, the
//! caller becomes an authenticated principal for the rest of the request.
//! It never rejects a request itself. A request whose token fails here reaches
//! the identity resolver without a principal, and the resolver surfaces the
//! token error.
//!
//! A principal already placed by an outer layer is left untouched.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::services::identity::{Principal, TEST_BYPASS_TOKEN};
use crate::services::token::{TokenError, TokenProvider};
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, principal_middleware))
}

async fn principal_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if req.extensions().get::<Principal>().is_none() {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != TEST_BYPASS_TOKEN);

        if let Some(token) = token {
            match authenticate(state.tokens.as_ref(), token) {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                }
                Err(err) => {
                    tracing::debug!(error = %err, "bearer token did not establish a principal");
                }
            }
        }
    }

    next.run(req).await
}

fn authenticate(tokens: &dyn TokenProvider, token: &str) -> Result<Principal, TokenError> {
    Ok(Principal::authenticated(
        tokens.username_from_token(token)?,
        tokens.user_id_from_token(token)?,
        tokens.client_id_from_token(token)?,
    ))
}
