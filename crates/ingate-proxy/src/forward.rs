//! Request forwarding to upstream inference backends.
//!
//! Each call issues exactly one outbound request. Whatever status the backend
//! answers with is returned as an [`UpstreamResponse`]; only transport
//! failures become errors.

use std::error::Error as _;

use bytes::Bytes;
use ingate_core::{GatewayConfig, UpstreamError};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const MODELS_PATH: &str = "/v1/models";

/// Raw upstream answer, relayed by the HTTP adapter.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Declared content type, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, UpstreamError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            error!("Failed to parse upstream response: {e}");
            UpstreamError::InvalidResponse("Upstream returned invalid JSON".to_string())
        })
    }
}

/// HTTP client for upstream calls.
///
/// Built once from the configured timeouts and shared by all requests; the
/// inner `reqwest::Client` pools connections and is cheap to clone.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// `POST {base_url}/v1/chat/completions` with a JSON body.
    pub async fn forward_chat_completion(
        &self,
        body: &Value,
        base_url: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = endpoint(base_url, CHAT_COMPLETIONS_PATH);
        debug!("Forwarding chat completion to {url}");

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        self.execute(request, &url, base_url).await
    }

    /// `GET {base_url}/v1/models`.
    pub async fn forward_models(&self, base_url: &str) -> Result<UpstreamResponse, UpstreamError> {
        let url = endpoint(base_url, MODELS_PATH);
        debug!("Forwarding models request to {url}");

        self.execute(self.client.get(&url), &url, base_url).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        base_url: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify(&e, url, base_url))?;

        let status = response.status();
        let headers = response.headers().clone();
        // The total timeout also covers reading the body.
        let body = response
            .bytes()
            .await
            .map_err(|e| classify(&e, url, base_url))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Upstream responded");
        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn classify(err: &reqwest::Error, url: &str, base_url: &str) -> UpstreamError {
    let message = describe(err);
    if err.is_timeout() {
        error!("Timeout error to upstream {url}: {message}");
        UpstreamError::Timeout {
            message,
            upstream: base_url.to_string(),
        }
    } else {
        error!("Connection error to upstream {url}: {message}");
        UpstreamError::Unreachable {
            message,
            upstream: base_url.to_string(),
        }
    }
}

/// Error text including its source chain (reqwest hides the root cause otherwise).
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
