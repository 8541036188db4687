//! Bearer-token collaborator used by the identity resolver.
//!
//! The resolver only needs three accessors; anything that can pull a login
//! name, user id and client id out of a token string can stand in here.

pub mod factory;
pub mod jwt;

use thiserror::Error;

pub use factory::build_token_provider;
pub use jwt::{JwtTokenProvider, TokenSubject};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("missing '{0}' claim")]
    MissingClaim(&'static str),

    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
}

pub trait TokenProvider: Send + Sync {
    fn username_from_token(&self, token: &str) -> Result<String, TokenError>;

    fn user_id_from_token(&self, token: &str) -> Result<i64, TokenError>;

    fn client_id_from_token(&self, token: &str) -> Result<i64, TokenError>;
}
