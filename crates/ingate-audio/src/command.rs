//! Transcoder invocation builder.
//!
//! Produces the ffmpeg-compatible argument list
//! `-y -i <in> -ac <channels> -ar <rate> [-af <filter>] -f wav <out>`.

use std::ffi::OsString;
use std::path::PathBuf;

use ingate_core::AudioConfig;
use tokio::process::Command;

/// Builder for one transcoder run.
///
/// ```rust,ignore
/// let cmd = TranscoderCommand::new("ffmpeg", input, output)
///     .channels(1)
///     .sample_rate(16_000)
///     .filter("loudnorm=I=-16:TP=-1.5:LRA=11")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TranscoderCommand {
    binary: PathBuf,
    input: PathBuf,
    output: PathBuf,
    channels: Option<u16>,
    sample_rate: Option<u32>,
    filter: Option<String>,
}

impl TranscoderCommand {
    pub fn new(
        binary: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            binary: binary.into(),
            input: input.into(),
            output: output.into(),
            channels: None,
            sample_rate: None,
            filter: None,
        }
    }

    /// Builder preloaded with the target format from `config`.
    pub fn from_config(
        config: &AudioConfig,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let builder = Self::new(&config.transcoder_bin, input, output)
            .channels(config.target_channels)
            .sample_rate(config.target_sample_rate);
        if config.loudnorm {
            builder.filter(config.loudnorm_filter.clone())
        } else {
            builder
        }
    }

    pub const fn channels(mut self, channels: u16) -> Self {
        self.channels = Some(channels);
        self
    }

    pub const fn sample_rate(mut self, hz: u32) -> Self {
        self.sample_rate = Some(hz);
        self
    }

    /// Audio filter graph passed through `-af`.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Argument vector, without the program name.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), self.input.clone().into()];
        if let Some(channels) = self.channels {
            args.push("-ac".into());
            args.push(channels.to_string().into());
        }
        if let Some(rate) = self.sample_rate {
            args.push("-ar".into());
            args.push(rate.to_string().into());
        }
        if let Some(filter) = &self.filter {
            args.push("-af".into());
            args.push(filter.into());
        }
        args.push("-f".into());
        args.push("wav".into());
        args.push(self.output.clone().into());
        args
    }

    /// Human-readable command line for debug logs.
    pub fn display(&self) -> String {
        let mut line = self.binary.display().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.args());
        cmd
    }
}
