//! Command-line launcher for the ingate gateway.

pub mod args;
pub mod logging;

pub use args::GatewayArgs;
pub use logging::init_logging;
