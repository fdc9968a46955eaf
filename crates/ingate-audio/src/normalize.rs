use std::process::Stdio;

use ingate_core::{AudioConfig, AudioError};
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::command::TranscoderCommand;

const SCRATCH_PREFIX: &str = "gateway_audio_";
const INPUT_FILE: &str = "input";
const OUTPUT_FILE: &str = "output.wav";

/// Transcoder diagnostics kept for the log line.
const STDERR_LOG_LIMIT: usize = 500;

/// Convert an upload into the configured WAV format.
///
/// The size limit is checked first and applies even when preprocessing is
/// disabled, in which case the input is returned unchanged. Otherwise the
/// bytes go through one transcoder run inside a private scratch directory
/// that is removed on every exit path.
pub async fn normalize(input: Vec<u8>, config: &AudioConfig) -> Result<Vec<u8>, AudioError> {
    if input.len() > config.max_upload_bytes {
        return Err(AudioError::TooLarge {
            limit: config.max_upload_bytes,
        });
    }

    if !config.preprocess_enabled {
        return Ok(input);
    }

    let scratch = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir()?;
    let input_path = scratch.path().join(INPUT_FILE);
    let output_path = scratch.path().join(OUTPUT_FILE);

    tokio::fs::write(&input_path, &input).await?;

    let invocation = TranscoderCommand::from_config(config, &input_path, &output_path);
    debug!(command = %invocation.display(), "Running transcoder");

    let mut command = invocation.build();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn()?;

    // Dropping the wait future on timeout kills the child.
    let output = match timeout(config.transcode_timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            warn!(
                timeout_s = config.transcode_timeout.as_secs(),
                "Transcoder timed out"
            );
            return Err(AudioError::Timeout(config.transcode_timeout.as_secs()));
        }
    };

    if !output.status.success() {
        let head = &output.stderr[..output.stderr.len().min(STDERR_LOG_LIMIT)];
        error!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(head),
            "Transcoder failed"
        );
        return Err(AudioError::Invalid(
            "Failed to decode input audio".to_string(),
        ));
    }

    let normalized = tokio::fs::read(&output_path).await?;
    debug!(
        input_bytes = input.len(),
        output_bytes = normalized.len(),
        "Audio normalized"
    );
    Ok(normalized)
}
