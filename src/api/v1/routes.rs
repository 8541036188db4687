/*
 * Responsibility
 * - URL structure of v1
 * - every v1 route sits behind the principal layer
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::identity::{client_identity, context_snapshot, whoami};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/identity", get(whoami))
        .route("/clients/{client_id}/identity", get(client_identity))
        .route("/context", get(context_snapshot));

    middleware::auth::principal::apply(router, state)
}
