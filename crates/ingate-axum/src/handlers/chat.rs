//! OpenAI-compatible passthrough handlers.

use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use ingate_core::GatewayError;
use ingate_core::chat::parse_chat_request;
use tracing::debug;

use crate::error::HttpError;
use crate::relay::relay;
use crate::state::AppState;

/// `POST /v1/chat/completions`: route by content and relay the upstream answer.
pub async fn chat_completions(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, HttpError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpError::RequestTooLarge {
                limit: state.chat_body_limit(),
            }
        } else {
            GatewayError::InvalidRequest(rejection.body_text()).into()
        }
    })?;

    if state.config().log_request_bodies {
        debug!(body = %String::from_utf8_lossy(&body), "Chat completion request body");
    }

    let request = parse_chat_request(&body)?;
    let upstream = state.gateway.forward_chat(&request).await?;
    Ok(relay(upstream))
}

/// `GET /v1/models`: relay the model listing of the models upstream.
pub async fn models(State(state): State<AppState>) -> Result<Response, HttpError> {
    let upstream = state.gateway.forward_models().await?;
    Ok(relay(upstream))
}
