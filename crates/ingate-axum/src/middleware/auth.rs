//! Bearer-token authentication.

use axum::extract::{Request, State};
use axum::http::{Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::HttpError;
use crate::routes::HEALTH_PATH;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Bearer-token check. A no-op when no API key is configured; `/health` and
/// CORS preflights are always public.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(api_key) = state.config().api_key.as_ref() else {
        return Ok(next.run(req).await);
    };
    if req.uri().path() == HEALTH_PATH || is_preflight(&req) {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    let rejection = match token {
        Some(token) if token == api_key.expose() => None,
        Some(_) => Some(HttpError::AuthFailed),
        None => Some(HttpError::AuthRequired),
    };
    if let Some(err) = rejection {
        warn!(
            path = %req.uri().path(),
            reason = err.error_type(),
            "Rejected unauthenticated request"
        );
        return Err(err);
    }

    Ok(next.run(req).await)
}

/// Browsers never attach credentials to a preflight; the CORS layer answers it.
fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
