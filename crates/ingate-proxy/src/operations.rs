//! The gateway pipeline.
//!
//! [`Gateway`] is the single implementation of route → forward (and
//! normalize → encode for audio). The HTTP handlers call the `forward_*`
//! methods and relay the raw response; embedding code calls the
//! `transcribe_audio` / `analyze_audio` / `chat_completion` / `list_models`
//! operations and gets parsed values back.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use ingate_core::chat::{
    analyze_system_prompt, audio_chat_request, chat_request, extract_message_content,
};
use ingate_core::{
    GatewayConfig, GatewayError, UpstreamError, select_models_upstream, select_upstream,
};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::forward::{UpstreamClient, UpstreamResponse};

/// Configured gateway pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    client: UpstreamClient,
}

impl Gateway {
    /// Build a pipeline over an already validated configuration.
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(&config)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Route a chat-completion document and forward it unchanged.
    pub async fn forward_chat(&self, body: &Value) -> Result<UpstreamResponse, GatewayError> {
        let base_url = select_upstream(body, &self.config)?;
        Ok(self.client.forward_chat_completion(body, base_url).await?)
    }

    /// Forward a model listing to the models upstream.
    pub async fn forward_models(&self) -> Result<UpstreamResponse, GatewayError> {
        let base_url = select_models_upstream(&self.config)?;
        Ok(self.client.forward_models(base_url).await?)
    }

    /// Transcribe an audio upload. `system_prompt` overrides the configured prompt.
    pub async fn transcribe_audio(
        &self,
        audio: Vec<u8>,
        system_prompt: Option<&str>,
    ) -> Result<String, GatewayError> {
        let prompt = system_prompt.unwrap_or(&self.config.transcribe_system_prompt);
        self.run_audio_task(audio, prompt).await
    }

    /// Run a free-form instruction over an audio upload.
    ///
    /// `prefix` overrides the configured system prompt prefix. The
    /// instruction is passed through verbatim.
    pub async fn analyze_audio(
        &self,
        audio: Vec<u8>,
        instruction: &str,
        prefix: Option<&str>,
    ) -> Result<String, GatewayError> {
        let prefix = prefix.unwrap_or(&self.config.analyze_system_prompt_prefix);
        let prompt = analyze_system_prompt(prefix, instruction);
        self.run_audio_task(audio, &prompt).await
    }

    /// Send a chat completion built from `messages` plus extra top-level
    /// parameters (`model`, `temperature`, ...) and return the parsed response.
    pub async fn chat_completion(
        &self,
        messages: Vec<Value>,
        params: Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let body = chat_request(messages, params);
        let response = self.forward_chat(&body).await?;
        Ok(response.json()?)
    }

    /// Fetch the upstream model listing as JSON.
    pub async fn list_models(&self) -> Result<Value, GatewayError> {
        let response = self.forward_models().await?;
        Ok(response.json()?)
    }

    async fn run_audio_task(
        &self,
        audio: Vec<u8>,
        system_prompt: &str,
    ) -> Result<String, GatewayError> {
        let normalized = ingate_audio::normalize(audio, &self.config.audio).await?;
        debug!(bytes = normalized.len(), "Encoding audio for upstream");

        let body = audio_chat_request(system_prompt, STANDARD.encode(&normalized));
        let response = self.forward_chat(&body).await?;

        let document: Value = serde_json::from_slice(&response.body).map_err(|e| {
            error!("Failed to parse upstream response: {e}");
            unexpected_structure()
        })?;
        let content = extract_message_content(&document).map_err(|e| {
            error!(
                status = response.status.as_u16(),
                "Failed to parse upstream response: {e}"
            );
            e
        })?;
        Ok(content.to_string())
    }
}

fn unexpected_structure() -> UpstreamError {
    UpstreamError::InvalidResponse(
        "Upstream returned an unexpected response structure".to_string(),
    )
}
