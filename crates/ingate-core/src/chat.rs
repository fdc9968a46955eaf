//! Chat-completion document helpers.
//!
//! Request bodies are kept as opaque JSON objects: the gateway only looks at
//! `messages` for routing and otherwise forwards caller fields untouched.

use serde_json::{Map, Value, json};

use crate::error::{GatewayError, UpstreamError};

/// Path of the assistant text in an OpenAI chat-completion response.
const MESSAGE_CONTENT_POINTER: &str = "/choices/0/message/content";

/// Parse an inbound chat-completion body.
///
/// Fails with `InvalidJson` when the bytes are not JSON and with
/// `InvalidRequest` when the document is not an object.
pub fn parse_chat_request(body: &[u8]) -> Result<Value, GatewayError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidJson(format!("Invalid JSON in request body: {e}")))?;
    if !value.is_object() {
        return Err(GatewayError::InvalidRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }
    Ok(value)
}

/// Build the chat-completion body sent for an audio task: a system message
/// followed by one user message holding the base64 WAV.
pub fn audio_chat_request(system_prompt: &str, audio_b64: String) -> Value {
    json!({
        "messages": [
            {"role": "system", "content": system_prompt},
            {
                "role": "user",
                "content": [{
                    "type": "input_audio",
                    "input_audio": {"data": audio_b64, "format": "wav"}
                }]
            }
        ]
    })
}

/// Build a chat-completion body from a message list plus extra top-level
/// parameters. `messages` always wins over a same-named extra.
pub fn chat_request(messages: Vec<Value>, extra: Map<String, Value>) -> Value {
    let mut body = extra;
    body.insert("messages".to_string(), Value::Array(messages));
    Value::Object(body)
}

/// System prompt for the analyze task.
pub fn analyze_system_prompt(prefix: &str, instruction: &str) -> String {
    if prefix.is_empty() {
        instruction.to_string()
    } else {
        format!("{prefix}\n{instruction}")
    }
}

/// Pull `choices[0].message.content` out of an upstream response.
pub fn extract_message_content(response: &Value) -> Result<&str, UpstreamError> {
    response
        .pointer(MESSAGE_CONTENT_POINTER)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            UpstreamError::InvalidResponse(
                "Upstream returned an unexpected response structure".to_string(),
            )
        })
}
