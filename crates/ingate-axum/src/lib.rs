//! Axum HTTP surface for the ingate gateway.
//!
//! Exposes the OpenAI-compatible passthrough endpoints, the audio
//! convenience endpoints and `/health` behind the request-id, auth,
//! size-guard and CORS middleware chain.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod relay;
pub mod routes;
pub mod state;

pub use bootstrap::{ServerConfig, bootstrap, serve, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::{AppState, GatewayContext};
