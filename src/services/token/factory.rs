/// Factory: build the token provider from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::token::JwtTokenProvider;

pub fn build_token_provider(config: &Config) -> Arc<JwtTokenProvider> {
    Arc::new(JwtTokenProvider::new(
        &config.jwt_secret,
        config.auth_issuer.clone(),
        config.token_ttl_seconds,
        config.token_leeway_seconds,
    ))
}
