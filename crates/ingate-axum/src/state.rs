//! Shared application state type.

use std::sync::Arc;

use ingate_core::GatewayConfig;
use ingate_proxy::Gateway;

/// Allowance on top of the audio upload ceiling for multipart framing
/// (boundaries, part headers, the `instruction` field).
pub const MULTIPART_ALLOWANCE: usize = 1024 * 1024;

/// Everything the handlers and middleware need.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub gateway: Gateway,
    /// Largest request body accepted on the audio routes.
    pub request_ceiling: usize,
}

impl GatewayContext {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let request_ceiling = config
            .audio
            .max_upload_bytes
            .saturating_add(MULTIPART_ALLOWANCE);
        let gateway = Gateway::new(Arc::new(config))?;
        Ok(Self {
            gateway,
            request_ceiling,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        self.gateway.config()
    }

    /// Largest chat-completion body accepted: room for a maximum-size
    /// upload after base64 expansion.
    pub const fn chat_body_limit(&self) -> usize {
        self.request_ceiling.saturating_mul(2)
    }
}

/// Application state shared across all handlers.
pub type AppState = Arc<GatewayContext>;
