/*
 * Responsibility
 * - the crate-wide AppError
 * - IntoResponse (HTTP status / JSON error body) as the single boundary mapping
 * - domain failures go through the translator; identity and config failures
 *   are mapped here
 */
pub mod translator;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::services::identity::IdentityError;

pub use translator::{DomainError, FailureKind, StructuredError, translate};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::new(FailureKind::PermissionDenied, message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::new(FailureKind::NotFound, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::new(FailureKind::BadRequest, message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::new(FailureKind::Unauthorized, message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::new(FailureKind::Conflict, message))
    }

    /// The body this error is rendered as.
    pub fn to_structured(&self) -> StructuredError {
        match self {
            AppError::Domain(e) => translator::translate_logged(e),
            AppError::Identity(e) => {
                warn!(error = %e, "identity resolution failed");
                // Token details stay in the log; the client only learns it is unauthorized.
                let message = match e {
                    IdentityError::InvalidIdentity(reason) => (*reason).to_string(),
                    IdentityError::Token(_) => "invalid access token".to_string(),
                };
                translate(&DomainError::new(FailureKind::Unauthorized, message))
            }
            AppError::Config(e) => {
                error!(error = %e, "configuration error surfaced in a request");
                StructuredError::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.to_structured();
        (body.status(), Json(body)).into_response()
    }
}
