//! Upstream forwarding and the gateway pipeline.
//!
//! - [`forward`]: one HTTP call per operation with typed transport errors
//! - [`operations`]: routing, audio normalization and forwarding composed
//!   into the operations both the HTTP surface and library users run

pub mod forward;
pub mod operations;

pub use forward::{UpstreamClient, UpstreamResponse};
pub use operations::Gateway;
