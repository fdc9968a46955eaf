//! Normalizer runs against small shell scripts standing in for ffmpeg.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ingate_audio::normalize;
use ingate_core::{AudioConfig, AudioError};
use tempfile::TempDir;

/// Write an executable script into `dir` and return its path.
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_with(bin: PathBuf) -> AudioConfig {
    AudioConfig {
        transcoder_bin: bin,
        transcode_timeout: Duration::from_secs(10),
        ..AudioConfig::default()
    }
}

#[tokio::test]
async fn successful_run_returns_output_file() {
    let tools = TempDir::new().unwrap();
    let args_log = tools.path().join("args");
    let bin = script(
        tools.path(),
        "fake-ffmpeg",
        &format!(
            "printf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\nprintf 'RIFFnormalized' > \"$last\"",
            args_log.display()
        ),
    );

    let out = normalize(b"raw-upload".to_vec(), &config_with(bin))
        .await
        .unwrap();
    assert_eq!(out, b"RIFFnormalized");

    let args = fs::read_to_string(&args_log).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "-y");
    assert_eq!(args[1], "-i");
    assert!(args[2].ends_with("/input"));
    assert!(args.windows(2).any(|w| w == ["-ac", "1"]));
    assert!(args.windows(2).any(|w| w == ["-ar", "16000"]));
    assert!(args.windows(2).any(|w| w == ["-f", "wav"]));
    assert!(args.last().unwrap().ends_with("/output.wav"));
}

#[tokio::test]
async fn input_bytes_reach_the_transcoder() {
    let tools = TempDir::new().unwrap();
    let bin = script(
        tools.path(),
        "copy-ffmpeg",
        "for last; do :; done\ncp \"$3\" \"$last\"",
    );

    let out = normalize(b"payload".to_vec(), &config_with(bin))
        .await
        .unwrap();
    assert_eq!(out, b"payload");
}

#[tokio::test]
async fn non_zero_exit_is_invalid_audio() {
    let tools = TempDir::new().unwrap();
    let bin = script(
        tools.path(),
        "failing-ffmpeg",
        "echo 'Invalid data found when processing input' >&2\nexit 1",
    );

    let err = normalize(b"garbage".to_vec(), &config_with(bin))
        .await
        .unwrap_err();
    assert!(matches!(err, AudioError::Invalid(_)));
}

#[tokio::test]
async fn slow_transcoder_times_out() {
    let tools = TempDir::new().unwrap();
    let bin = script(tools.path(), "slow-ffmpeg", "exec sleep 5");

    let config = AudioConfig {
        transcode_timeout: Duration::from_millis(200),
        ..config_with(bin)
    };

    let err = normalize(b"audio".to_vec(), &config).await.unwrap_err();
    assert!(matches!(err, AudioError::Timeout(_)));
}

#[tokio::test]
async fn scratch_directory_removed_on_success_and_failure() {
    let tools = TempDir::new().unwrap();
    let seen = tools.path().join("seen");

    let ok_bin = script(
        tools.path(),
        "ok-ffmpeg",
        &format!(
            "dirname \"$3\" > '{}'\nfor last; do :; done\ncp \"$3\" \"$last\"",
            seen.display()
        ),
    );
    normalize(b"one".to_vec(), &config_with(ok_bin))
        .await
        .unwrap();
    let scratch = fs::read_to_string(&seen).unwrap();
    let scratch = Path::new(scratch.trim());
    assert!(
        scratch
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("gateway_audio_")
    );
    assert!(!scratch.exists());

    let bad_bin = script(
        tools.path(),
        "bad-ffmpeg",
        &format!("dirname \"$3\" > '{}'\nexit 2", seen.display()),
    );
    normalize(b"two".to_vec(), &config_with(bad_bin))
        .await
        .unwrap_err();
    let scratch = fs::read_to_string(&seen).unwrap();
    assert!(!Path::new(scratch.trim()).exists());
}

#[tokio::test]
async fn scratch_directory_removed_after_timeout() {
    let tools = TempDir::new().unwrap();
    let seen = tools.path().join("seen");
    let bin = script(
        tools.path(),
        "stuck-ffmpeg",
        &format!("dirname \"$3\" > '{}'\nexec sleep 30", seen.display()),
    );
    let config = AudioConfig {
        transcode_timeout: Duration::from_secs(1),
        ..config_with(bin)
    };

    let err = normalize(b"audio".to_vec(), &config).await.unwrap_err();
    assert!(matches!(err, AudioError::Timeout(1)));

    let scratch = fs::read_to_string(&seen).unwrap();
    let scratch = Path::new(scratch.trim());
    assert!(scratch.is_absolute());
    assert!(!scratch.exists());
}

#[tokio::test]
async fn missing_output_file_is_io_error() {
    let tools = TempDir::new().unwrap();
    let bin = script(tools.path(), "lazy-ffmpeg", "exit 0");

    let err = normalize(b"audio".to_vec(), &config_with(bin))
        .await
        .unwrap_err();
    assert!(matches!(err, AudioError::Io(_)));
}
