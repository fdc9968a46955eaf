//! Declared-size guard for audio uploads.

use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::HttpError;
use crate::routes::{ANALYZE_PATH, TRANSCRIBE_PATH};
use crate::state::AppState;

/// Reject audio uploads whose declared `Content-Length` exceeds the request
/// ceiling before any of the body is read.
///
/// A missing or unparsable length passes; the body limit on the route and
/// the normalizer still bound what is actually read.
pub async fn guard_upload_size(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    if req.method() == Method::POST && is_guarded(req.uri().path()) {
        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());

        if let Some(length) = declared
            && length > state.request_ceiling as u64
        {
            warn!(
                content_length = length,
                limit = state.request_ceiling,
                "Rejected oversized upload"
            );
            return Err(HttpError::RequestTooLarge {
                limit: state.request_ceiling,
            });
        }
    }

    Ok(next.run(req).await)
}

fn is_guarded(path: &str) -> bool {
    matches!(path, TRANSCRIBE_PATH | ANALYZE_PATH)
}
