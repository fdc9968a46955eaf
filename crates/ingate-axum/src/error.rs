//! HTTP error mapping.
//!
//! [`HttpError`] is the only place where error kinds become status codes.
//! Every non-relay error response has the shape
//! `{"error": {"type": ..., "message": ...}, "upstream": ...}` where
//! `upstream` is present for forwarding failures only.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use ingate_core::{AudioError, GatewayError, UpstreamError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message returned for server-side faults. Details are only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Missing or malformed Authorization header. Expected: Bearer <API_KEY>")]
    AuthRequired,

    #[error("Invalid API key")]
    AuthFailed,

    #[error("Request body exceeds maximum allowed size ({limit} bytes)")]
    RequestTooLarge { limit: usize },

    /// Defect caught at the outermost layer (panic).
    #[error("{}", INTERNAL_ERROR_MESSAGE)]
    Internal,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthRequired | Self::AuthFailed => StatusCode::UNAUTHORIZED,
            Self::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(err) => match err {
                GatewayError::InvalidJson(_)
                | GatewayError::InvalidRequest(_)
                | GatewayError::Audio(
                    AudioError::TooLarge { .. } | AudioError::Invalid(_) | AudioError::Timeout(_),
                ) => StatusCode::BAD_REQUEST,
                GatewayError::Routing(_) | GatewayError::Audio(AudioError::Io(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                GatewayError::Upstream(
                    UpstreamError::Unreachable { .. } | UpstreamError::InvalidResponse(_),
                ) => StatusCode::BAD_GATEWAY,
                GatewayError::Upstream(UpstreamError::Timeout { .. }) => {
                    StatusCode::GATEWAY_TIMEOUT
                }
            },
        }
    }

    /// Stable `error.type` discriminant.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Gateway(err) => err.error_type(),
            Self::AuthRequired => "auth_required",
            Self::AuthFailed => "auth_failed",
            Self::RequestTooLarge { .. } => "request_too_large",
            Self::Internal => "internal_error",
        }
    }

    const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal | Self::Gateway(GatewayError::Audio(AudioError::Io(_)))
        )
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    error_type: &'static str,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if self.is_internal() {
            error!(error = %self, "Internal error while handling request");
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let upstream = match &self {
            Self::Gateway(err) => err.upstream().map(str::to_owned),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                error_type: self.error_type(),
                message,
            },
            upstream,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<UpstreamError> for HttpError {
    fn from(err: UpstreamError) -> Self {
        Self::Gateway(err.into())
    }
}

impl From<AudioError> for HttpError {
    fn from(err: AudioError) -> Self {
        Self::Gateway(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use ingate_core::RoutingError;
    use serde_json::Value;

    async fn body_json(err: HttpError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_table() {
        let cases: Vec<(HttpError, StatusCode)> = vec![
            (
                GatewayError::InvalidJson("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AudioError::TooLarge { limit: 5 }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (AudioError::Timeout(60).into(), StatusCode::BAD_REQUEST),
            (HttpError::AuthFailed, StatusCode::UNAUTHORIZED),
            (
                HttpError::RequestTooLarge { limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                GatewayError::from(RoutingError::MissingTextUpstream).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                UpstreamError::InvalidResponse("x".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                UpstreamError::Timeout {
                    message: "x".into(),
                    upstream: "http://u".into(),
                }
                .into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AudioError::Io(std::io::Error::other("spawn")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_upstream_errors_echo_upstream() {
        let (status, body) = body_json(
            UpstreamError::Unreachable {
                message: "connection refused".into(),
                upstream: "http://10.0.0.1:8000".into(),
            }
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "upstream_unreachable");
        assert_eq!(body["upstream"], "http://10.0.0.1:8000");
    }

    #[tokio::test]
    async fn test_non_forwarding_errors_omit_upstream() {
        let (_, body) = body_json(HttpError::AuthRequired).await;

        assert_eq!(body["error"]["type"], "auth_required");
        assert!(body.get("upstream").is_none());
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let (status, body) =
            body_json(AudioError::Io(std::io::Error::other("/tmp/secret path")).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "internal_error");
        assert_eq!(body["error"]["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_panic_error_uses_generic_message() {
        assert_eq!(HttpError::Internal.to_string(), INTERNAL_ERROR_MESSAGE);

        let (status, body) = body_json(HttpError::Internal).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], INTERNAL_ERROR_MESSAGE);
    }
}
