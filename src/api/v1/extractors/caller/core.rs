use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::services::identity::{Principal, RequestSource};
use crate::state::AppState;

use super::Caller;

/// Never rejects: a missing principal is `Absent` and a missing header is
/// recorded as such. Whether that is acceptable is decided at resolution time.
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .unwrap_or_default();

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Caller::new(
            principal,
            RequestSource::Http { authorization },
            state.identity.clone(),
        ))
    }
}
