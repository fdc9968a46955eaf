//! Panic recovery for the catch-panic layer.

use std::any::Any;

use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::HttpError;

/// Turn a handler panic into a 500 `internal_error` response.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "Handler panicked");

    HttpError::Internal.into_response()
}
