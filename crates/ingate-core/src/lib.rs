//! Core domain for the ingate inference gateway.
//!
//! This crate holds everything the gateway pipeline decides without touching
//! the network or the filesystem: the validated [`GatewayConfig`], the
//! upstream [`routing`] policy, the chat document helpers and the error
//! taxonomy every adapter maps from.

pub mod chat;
pub mod config;
pub mod error;
pub mod request_id;
pub mod routing;

// Re-export commonly used types for convenience
pub use config::{
    ApiKey, AudioConfig, ConfigError, DEFAULT_CONNECT_TIMEOUT, DEFAULT_LOUDNORM_FILTER,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TRANSCODE_TIMEOUT,
    DEFAULT_TRANSCRIBE_PROMPT, GatewayConfig, RoutingMode, parse_flag,
};
pub use error::{AudioError, GatewayError, RoutingError, UpstreamError};
pub use request_id::{REQUEST_ID_HEADER, RequestId};
pub use routing::{has_audio_content, select_models_upstream, select_upstream};

/// Gateway version reported by the health endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
