//! Domain failure → structured error body.
//!
//! The status code is fixed by the failure kind; callers choose only the message.

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub const ACCESS_DENIED_PREFIX: &str = "Access Denied: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    PermissionDenied,
    NotFound,
    BadRequest,
    Unauthorized,
    Conflict,
}

impl FailureKind {
    pub const fn status(self) -> StatusCode {
        match self {
            FailureKind::PermissionDenied => StatusCode::FORBIDDEN,
            FailureKind::NotFound => StatusCode::NOT_FOUND,
            FailureKind::BadRequest => StatusCode::BAD_REQUEST,
            FailureKind::Unauthorized => StatusCode::UNAUTHORIZED,
            FailureKind::Conflict => StatusCode::CONFLICT,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "Forbidden",
            FailureKind::NotFound => "Not Found",
            FailureKind::BadRequest => "Bad Request",
            FailureKind::Unauthorized => "Unauthorized",
            FailureKind::Conflict => "Conflict",
        }
    }
}

/// A failure raised by business logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DomainError {
    pub kind: FailureKind,
    pub message: String,
}

impl DomainError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Wire-level error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredError {
    pub kind: String,
    pub message: String,
    pub status_code: u16,
}

impl StructuredError {
    pub fn internal() -> Self {
        Self {
            kind: "Internal Server Error".to_string(),
            message: "internal server error".to_string(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub fn translate(err: &DomainError) -> StructuredError {
    let message = match err.kind {
        FailureKind::PermissionDenied => format!("{ACCESS_DENIED_PREFIX}{}", err.message),
        _ => err.message.clone(),
    };

    StructuredError {
        kind: err.kind.label().to_string(),
        message,
        status_code: err.kind.status().as_u16(),
    }
}

/// Same as [`translate`], logging the original failure first.
pub fn translate_logged(err: &DomainError) -> StructuredError {
    warn!(kind = ?err.kind, message = %err.message, "request failed");
    translate(err)
}
