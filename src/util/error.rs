use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::dto::quote_dto::ErrorResponse;

#[derive(Debug, Serialize)]
pub enum HandlerErrorKind {
    SchemaInvalid,
    Validation,
    BadRequest,
    Internal,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::SchemaInvalid => "SchemaInvalid",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::BadRequest => "BadRequest",
            HandlerErrorKind::Internal => "Internal",
        };
        write!(f, "{}", s)
    }
}

/// Handler-level failure: an error kind (which decides the status code)
/// plus the response envelope sent to the caller.
#[derive(Debug)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub body: ErrorResponse,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, body: ErrorResponse) -> Self {
        HandlerError { error, body }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.body.error)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::SchemaInvalid => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = axum::Json(self.body);
        (status, body).into_response()
    }
}

/// Service-layer failure kinds, pattern-matched by the handlers into
/// status codes and response envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] crate::service::normalizer::NormalizeError),

    #[error("Render failed: {0}")]
    Render(#[from] crate::util::pdf::PdfError),

    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] crate::util::email::EmailError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
