//! Upstream selection.
//!
//! Pure functions over the request document and the configuration; nothing
//! here performs I/O.

use serde_json::Value;

use crate::config::{GatewayConfig, RoutingMode};
use crate::error::RoutingError;

/// Content-part types that mark a message as carrying audio.
const AUDIO_PART_TYPES: [&str; 2] = ["input_audio", "audio"];

/// True when any message has a list `content` with an audio part.
///
/// Only top-level `content` lists are inspected. String content is text.
pub fn has_audio_content(messages: &[Value]) -> bool {
    messages.iter().any(|message| {
        message
            .get("content")
            .and_then(Value::as_array)
            .is_some_and(|parts| parts.iter().any(is_audio_part))
    })
}

fn is_audio_part(part: &Value) -> bool {
    part.get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| AUDIO_PART_TYPES.contains(&kind))
}

/// Pick the base URL a chat-completion request should be forwarded to.
pub fn select_upstream<'a>(
    request: &Value,
    config: &'a GatewayConfig,
) -> Result<&'a str, RoutingError> {
    match config.routing_mode {
        RoutingMode::Single => config
            .effective_base_url()
            .ok_or(RoutingError::NoSingleUpstream),
        RoutingMode::AudioText => {
            let messages = request
                .get("messages")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice);
            if has_audio_content(messages) {
                config
                    .audio_base_url()
                    .ok_or(RoutingError::MissingAudioUpstream)
            } else {
                config
                    .text_base_url()
                    .ok_or(RoutingError::MissingTextUpstream)
            }
        }
    }
}

/// Pick the base URL for the model listing. In `audio_text` mode this is
/// always the text upstream.
pub fn select_models_upstream(config: &GatewayConfig) -> Result<&str, RoutingError> {
    match config.routing_mode {
        RoutingMode::Single => config
            .effective_base_url()
            .ok_or(RoutingError::NoSingleUpstream),
        RoutingMode::AudioText => config
            .text_base_url()
            .ok_or(RoutingError::MissingTextUpstream),
    }
}
