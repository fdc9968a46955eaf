//! Gateway configuration domain types and validation.
//!
//! The configuration is built once at startup, validated with
//! [`GatewayConfig::validate`] and then shared read-only (behind an `Arc`)
//! by the middleware chain, the handlers and the library operations.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default total timeout for one upstream call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connect timeout for one upstream call.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hard wall-clock limit for one transcoder invocation.
pub const DEFAULT_TRANSCODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default ceiling for uploaded audio, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20_000_000;

/// EBU R128 loudness normalization filter.
pub const DEFAULT_LOUDNORM_FILTER: &str = "loudnorm=I=-16:TP=-1.5:LRA=11";

/// System prompt used by the transcribe endpoint unless configured.
pub const DEFAULT_TRANSCRIBE_PROMPT: &str =
    "You are a helpful assistant that transcribes audio accurately.";

/// Strategy used to pick an upstream for a chat completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutingMode {
    /// Every request goes to one upstream.
    #[default]
    Single,
    /// Requests carrying audio parts go to the audio upstream, the rest to text.
    AudioText,
}

impl RoutingMode {
    /// Stable lowercase name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::AudioText => "audio_text",
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "audio_text" => Ok(Self::AudioText),
            other => Err(ConfigError::UnknownRoutingMode(other.to_string())),
        }
    }
}

/// Shared-secret bearer token.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for comparison against a presented token.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Audio preprocessing settings used by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// When false, uploads are forwarded byte-for-byte (size limit still applies).
    pub preprocess_enabled: bool,
    /// Target sample rate in Hz.
    pub target_sample_rate: u32,
    /// Target channel count (1 = mono).
    pub target_channels: u16,
    /// Whether to pass the loudness filter to the transcoder.
    pub loudnorm: bool,
    pub loudnorm_filter: String,
    /// Upload ceiling in bytes, checked before any processing.
    pub max_upload_bytes: usize,
    /// Transcoder binary (`ffmpeg` by default, resolved through `PATH`).
    pub transcoder_bin: PathBuf,
    pub transcode_timeout: Duration,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            preprocess_enabled: true,
            target_sample_rate: 16_000,
            target_channels: 1,
            loudnorm: true,
            loudnorm_filter: DEFAULT_LOUDNORM_FILTER.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            transcoder_bin: PathBuf::from("ffmpeg"),
            transcode_timeout: DEFAULT_TRANSCODE_TIMEOUT,
        }
    }
}

/// Immutable gateway configuration.
///
/// Empty URL strings are treated the same as `None` everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub text_base_url: Option<String>,
    pub audio_base_url: Option<String>,
    /// Used in single mode; falls back to `text_base_url` when unset.
    pub default_base_url: Option<String>,
    pub routing_mode: RoutingMode,
    /// Total deadline for one upstream call.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// When set, every path except `/health` requires `Authorization: Bearer <key>`.
    pub api_key: Option<ApiKey>,
    /// CORS origins echoed back to browsers. Empty disables cross-origin access.
    pub allowed_origins: Vec<String>,
    pub audio: AudioConfig,
    pub transcribe_system_prompt: String,
    pub analyze_system_prompt_prefix: String,
    /// Log raw chat-completion bodies at debug level. Development only.
    pub log_request_bodies: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            text_base_url: None,
            audio_base_url: None,
            default_base_url: None,
            routing_mode: RoutingMode::Single,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            api_key: None,
            allowed_origins: Vec::new(),
            audio: AudioConfig::default(),
            transcribe_system_prompt: DEFAULT_TRANSCRIBE_PROMPT.to_string(),
            analyze_system_prompt_prefix: String::new(),
            log_request_bodies: false,
        }
    }
}

impl GatewayConfig {
    /// Config with a single text upstream and defaults for everything else.
    pub fn single(text_base_url: impl Into<String>) -> Self {
        Self {
            text_base_url: Some(text_base_url.into()),
            ..Self::default()
        }
    }

    /// Config routing audio and text requests to separate upstreams.
    pub fn audio_text(text_base_url: impl Into<String>, audio_base_url: impl Into<String>) -> Self {
        Self {
            text_base_url: Some(text_base_url.into()),
            audio_base_url: Some(audio_base_url.into()),
            routing_mode: RoutingMode::AudioText,
            ..Self::default()
        }
    }

    pub fn text_base_url(&self) -> Option<&str> {
        non_empty(self.text_base_url.as_ref())
    }

    pub fn audio_base_url(&self) -> Option<&str> {
        non_empty(self.audio_base_url.as_ref())
    }

    pub fn default_base_url(&self) -> Option<&str> {
        non_empty(self.default_base_url.as_ref())
    }

    /// Upstream used in single mode: the default URL, else the text URL.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.default_base_url().or_else(|| self.text_base_url())
    }

    /// Validate the whole configuration, failing on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("TEXT_BASE_URL", self.text_base_url()),
            ("AUDIO_BASE_URL", self.audio_base_url()),
            ("DEFAULT_BASE_URL", self.default_base_url()),
        ] {
            if let Some(url) = value {
                validate_base_url(name, url)?;
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout("UPSTREAM_TIMEOUT_S"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout("UPSTREAM_CONNECT_TIMEOUT_S"));
        }
        if self.audio.transcode_timeout.is_zero() {
            return Err(ConfigError::NonPositiveTimeout("transcode timeout"));
        }

        match self.routing_mode {
            RoutingMode::AudioText => {
                if self.text_base_url().is_none() {
                    return Err(ConfigError::MissingUpstream {
                        setting: "TEXT_BASE_URL",
                        mode: RoutingMode::AudioText,
                    });
                }
                if self.audio_base_url().is_none() {
                    return Err(ConfigError::MissingUpstream {
                        setting: "AUDIO_BASE_URL",
                        mode: RoutingMode::AudioText,
                    });
                }
            }
            RoutingMode::Single => {
                if self.effective_base_url().is_none() {
                    return Err(ConfigError::MissingUpstream {
                        setting: "DEFAULT_BASE_URL or TEXT_BASE_URL",
                        mode: RoutingMode::Single,
                    });
                }
            }
        }

        Ok(())
    }

    /// Consume and return the config if it validates.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be an absolute http(s) URL with a host, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{0} must be positive")]
    NonPositiveTimeout(&'static str),

    #[error("{setting} is required when ROUTING_MODE={mode}")]
    MissingUpstream {
        setting: &'static str,
        mode: RoutingMode,
    },

    #[error("ROUTING_MODE must be 'single' or 'audio_text', got {0:?}")]
    UnknownRoutingMode(String),

    #[error("boolean setting must be one of 0, 1, true, false, yes, no; got {0:?}")]
    InvalidFlag(String),
}

/// Parse a boolean setting the way the environment file spells it.
pub fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag(value.to_string())),
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn validate_base_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let parsed = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}
