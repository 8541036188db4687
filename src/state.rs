/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 * - Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::services::identity::IdentityResolver;
use crate::services::token::TokenProvider;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<dyn TokenProvider>,
    pub identity: Arc<IdentityResolver>,
}

impl AppState {
    pub fn new(tokens: Arc<dyn TokenProvider>, identity: Arc<IdentityResolver>) -> Self {
        Self { tokens, identity }
    }
}
