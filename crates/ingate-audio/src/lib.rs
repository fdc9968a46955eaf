//! Audio normalization for ingate.
//!
//! Uploads are validated against the size ceiling and then converted to the
//! configured sample rate, channel layout and loudness by running an external
//! ffmpeg-compatible transcoder.

pub mod command;
mod normalize;

pub use command::TranscoderCommand;
pub use normalize::normalize;
