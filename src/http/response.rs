//! Client-facing error responses.
//!
//! # Design Decisions
//! - Exhaustion and a fully dead pool look the same to the client: 503
//! - Plain-text bodies; upstream responses are never rewritten

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;

use crate::error::RouteError;

pub const SERVICE_UNAVAILABLE_BODY: &str = "Service not available";

impl RouteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::NoBackendAvailable | RouteError::Exhausted { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        (self.status_code(), SERVICE_UNAVAILABLE_BODY).into_response()
    }
}

/// Response for a request body over the buffering limit.
pub fn payload_too_large(limit: usize) -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        format!("Request body exceeds {} bytes", limit),
    )
        .into_response()
}

/// Response for a request body that could not be buffered: 413 when the
/// limit was hit, 400 for an aborted or malformed body.
pub fn body_read_failure(err: &axum::Error, limit: usize) -> Response {
    if is_length_limit(err) {
        payload_too_large(limit)
    } else {
        (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
    }
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
