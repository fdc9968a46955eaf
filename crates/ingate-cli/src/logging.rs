//! Tracing subscriber setup.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Transport crates that are only interesting when something breaks.
const QUIET_TARGETS: [&str; 2] = ["hyper", "reqwest"];

/// Map a `LOG_LEVEL` value onto a tracing level directive.
///
/// Accepts the level names operators already use for the gateway
/// (`WARNING`, `CRITICAL`) alongside tracing's own.
pub fn parse_log_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok("trace"),
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARN" | "WARNING" => Ok("warn"),
        "ERROR" | "CRITICAL" => Ok("error"),
        _ => Err(format!(
            "expected one of DEBUG, INFO, WARNING, ERROR, CRITICAL; got {level:?}"
        )),
    }
}

/// Install the global `fmt` subscriber at `directive`.
///
/// `RUST_LOG`, when set, replaces the filter derived from `directive`.
pub fn init_logging(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(directive)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}

fn default_filter(level: &str) -> String {
    let mut filter = level.to_string();
    for target in QUIET_TARGETS {
        filter.push_str(&format!(",{target}=warn"));
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(parse_log_level("DEBUG"), Ok("debug"));
        assert_eq!(parse_log_level("info"), Ok("info"));
        assert_eq!(parse_log_level("Warning"), Ok("warn"));
        assert_eq!(parse_log_level("CRITICAL"), Ok("error"));
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_transport_crates_are_capped() {
        assert_eq!(default_filter("debug"), "debug,hyper=warn,reqwest=warn");
    }
}
