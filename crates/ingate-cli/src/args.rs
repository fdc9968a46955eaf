//! Command-line arguments with environment-variable fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use ingate_axum::ServerConfig;
use ingate_core::config::{
    DEFAULT_LOUDNORM_FILTER, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_TRANSCODE_TIMEOUT,
    DEFAULT_TRANSCRIBE_PROMPT,
};
use ingate_core::{ApiKey, AudioConfig, ConfigError, GatewayConfig, RoutingMode, parse_flag};

use crate::logging::parse_log_level;

/// OpenAI-compatible gateway in front of local inference backends.
///
/// Every option can also be set through the environment variable named in
/// its help text; a `.env` file in the working directory is read first.
#[derive(Debug, Parser)]
#[command(name = "ingate")]
#[command(version = ingate_core::VERSION)]
pub struct GatewayArgs {
    /// Interface to listen on
    #[arg(long, env = "GATEWAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8090, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Upstream for text requests
    #[arg(long, env = "TEXT_BASE_URL")]
    pub text_base_url: Option<String>,

    /// Upstream for requests carrying audio (audio_text mode)
    #[arg(long, env = "AUDIO_BASE_URL")]
    pub audio_base_url: Option<String>,

    /// Upstream for everything in single mode; falls back to the text upstream
    #[arg(long, env = "DEFAULT_BASE_URL")]
    pub default_base_url: Option<String>,

    /// `single` or `audio_text`
    #[arg(long, env = "ROUTING_MODE", default_value = "single")]
    pub routing_mode: RoutingMode,

    /// Total deadline for one upstream call, in seconds
    #[arg(long = "upstream-timeout-s", env = "UPSTREAM_TIMEOUT_S", default_value = "300", value_parser = parse_seconds)]
    pub upstream_timeout: Duration,

    /// Deadline for establishing an upstream connection, in seconds
    #[arg(long = "upstream-connect-timeout-s", env = "UPSTREAM_CONNECT_TIMEOUT_S", default_value = "10", value_parser = parse_seconds)]
    pub upstream_connect_timeout: Duration,

    /// Require `Authorization: Bearer <key>` on every path but /health
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Comma-separated CORS origins, or `*`
    #[arg(long = "allow-origins", env = "ALLOW_ORIGINS", value_delimiter = ',')]
    pub allow_origins: Vec<String>,

    /// Transcoder executable
    #[arg(long, env = "FFMPEG_BIN", default_value = "ffmpeg")]
    pub ffmpeg_bin: PathBuf,

    /// Convert uploads to mono WAV before forwarding
    #[arg(long, env = "AUDIO_PREPROCESS_ENABLED", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub audio_preprocess_enabled: bool,

    /// Output sample rate in Hz
    #[arg(long = "audio-target-sr", env = "AUDIO_TARGET_SR", default_value_t = 16_000, value_parser = clap::value_parser!(u32).range(1..))]
    pub audio_target_sample_rate: u32,

    /// Output channel count
    #[arg(long, env = "AUDIO_TARGET_CHANNELS", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub audio_target_channels: u16,

    /// Apply loudness normalization
    #[arg(long, env = "AUDIO_LOUDNORM", default_value = "true", action = ArgAction::Set, value_parser = parse_flag)]
    pub audio_loudnorm: bool,

    /// Transcoder audio filter used for loudness normalization
    #[arg(long, env = "AUDIO_LOUDNORM_FILTER", default_value = DEFAULT_LOUDNORM_FILTER)]
    pub audio_loudnorm_filter: String,

    /// Largest accepted audio upload, in bytes
    #[arg(long, env = "AUDIO_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub audio_max_upload_bytes: usize,

    /// System prompt for /v1/transcribe
    #[arg(long, env = "TRANSCRIBE_SYSTEM_PROMPT", default_value = DEFAULT_TRANSCRIBE_PROMPT)]
    pub transcribe_system_prompt: String,

    /// Text placed before the instruction on /v1/analyze
    #[arg(long, env = "ANALYZE_SYSTEM_PROMPT_PREFIX", default_value = "")]
    pub analyze_system_prompt_prefix: String,

    /// DEBUG, INFO, WARNING, ERROR or CRITICAL. RUST_LOG takes precedence.
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO", value_parser = parse_log_level)]
    pub log_level: &'static str,

    /// Log raw chat-completion bodies at debug level
    #[arg(long, env = "LOG_REQUEST_BODIES", default_value = "false", action = ArgAction::Set, value_parser = parse_flag)]
    pub log_request_bodies: bool,
}

impl GatewayArgs {
    /// Split the arguments into gateway and listener configuration.
    ///
    /// The gateway configuration is validated before it is returned.
    pub fn into_config(self) -> Result<(GatewayConfig, ServerConfig), ConfigError> {
        let server = ServerConfig {
            host: self.host,
            port: self.port,
        };

        let allowed_origins = self
            .allow_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();

        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .map(ApiKey::new);

        let config = GatewayConfig {
            text_base_url: self.text_base_url,
            audio_base_url: self.audio_base_url,
            default_base_url: self.default_base_url,
            routing_mode: self.routing_mode,
            request_timeout: self.upstream_timeout,
            connect_timeout: self.upstream_connect_timeout,
            api_key,
            allowed_origins,
            audio: AudioConfig {
                preprocess_enabled: self.audio_preprocess_enabled,
                target_sample_rate: self.audio_target_sample_rate,
                target_channels: self.audio_target_channels,
                loudnorm: self.audio_loudnorm,
                loudnorm_filter: self.audio_loudnorm_filter,
                max_upload_bytes: self.audio_max_upload_bytes,
                transcoder_bin: self.ffmpeg_bin,
                transcode_timeout: DEFAULT_TRANSCODE_TIMEOUT,
            },
            transcribe_system_prompt: self.transcribe_system_prompt,
            analyze_system_prompt_prefix: self.analyze_system_prompt_prefix,
            log_request_bodies: self.log_request_bodies,
        };

        Ok((config.validated()?, server))
    }
}

/// Parse a strictly positive number of seconds, fractions allowed.
fn parse_seconds(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("expected a number of seconds, got {value:?}"))?;
    if seconds <= 0.0 {
        return Err(format!("must be positive, got {value:?}"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("{value:?}: {e}"))
}
