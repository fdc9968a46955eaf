//! Error taxonomy for the gateway pipeline.
//!
//! Every failure the pipeline can produce is one of these variants. The HTTP
//! adapter maps them to a status and a stable `error.type` string; library
//! callers match on them directly.

use thiserror::Error;

/// No upstream could be selected for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error(
        "No upstream URL configured for single routing mode. Set DEFAULT_BASE_URL or TEXT_BASE_URL."
    )]
    NoSingleUpstream,

    #[error("AUDIO_BASE_URL is required when routing audio requests")]
    MissingAudioUpstream,

    #[error("TEXT_BASE_URL is required when routing text requests")]
    MissingTextUpstream,
}

/// Failure talking to an inference backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Connection refused, DNS failure, reset mid-body.
    #[error("Connection to upstream failed: {message}")]
    Unreachable { message: String, upstream: String },

    /// Connect or total timeout elapsed.
    #[error("Inference backend did not respond in time")]
    Timeout { message: String, upstream: String },

    /// The backend answered but the body is not what the operation needs.
    #[error("{0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Base URL of the backend involved, when known.
    pub fn upstream(&self) -> Option<&str> {
        match self {
            Self::Unreachable { upstream, .. } | Self::Timeout { upstream, .. } => Some(upstream),
            Self::InvalidResponse(_) => None,
        }
    }
}

/// Failure while validating or normalizing an audio upload.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio upload exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    /// The transcoder rejected the input. The message is safe to return to callers.
    #[error("{0}")]
    Invalid(String),

    #[error("Audio preprocessing timed out after {0} seconds")]
    Timeout(u64),

    /// Scratch directory, file or process spawn failure.
    #[error("Audio preprocessing I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for one gateway operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidJson(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

impl GatewayError {
    /// Stable machine-readable kind reported as `error.type`.
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid_json",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Routing(_) => "configuration_error",
            Self::Upstream(UpstreamError::Unreachable { .. }) => "upstream_unreachable",
            Self::Upstream(UpstreamError::Timeout { .. }) => "upstream_timeout",
            Self::Upstream(UpstreamError::InvalidResponse(_)) => "upstream_invalid_response",
            Self::Audio(AudioError::TooLarge { .. }) => "audio_too_large",
            Self::Audio(AudioError::Invalid(_)) => "invalid_audio",
            Self::Audio(AudioError::Timeout(_)) => "audio_timeout",
            Self::Audio(AudioError::Io(_)) => "internal_error",
        }
    }

    /// Base URL of the upstream involved, for upstream failures.
    pub fn upstream(&self) -> Option<&str> {
        match self {
            Self::Upstream(err) => err.upstream(),
            _ => None,
        }
    }
}
