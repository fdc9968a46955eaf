//! Server bootstrap - the composition root.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use ingate_core::GatewayConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::create_router;
use crate::state::{AppState, GatewayContext};

/// Listen address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Validate the configuration and build the shared state.
pub fn bootstrap(config: GatewayConfig) -> Result<AppState> {
    config.validate().context("Invalid gateway configuration")?;

    info!(
        routing_mode = %config.routing_mode,
        text_upstream = config.text_base_url().unwrap_or("-"),
        audio_upstream = config.audio_base_url().unwrap_or("-"),
        default_upstream = config.default_base_url().unwrap_or("-"),
        auth_enabled = config.api_key.is_some(),
        audio_preprocessing = config.audio.preprocess_enabled,
        "Initializing gateway"
    );

    let ctx = GatewayContext::new(config).context("Failed to build upstream HTTP client")?;
    Ok(Arc::new(ctx))
}

/// Start the gateway and serve until Ctrl-C or SIGTERM.
pub async fn start_server(config: GatewayConfig, server: ServerConfig) -> Result<()> {
    let state = bootstrap(config)?;

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        "ingate v{} listening on http://{}",
        ingate_core::VERSION,
        listener.local_addr()?
    );

    serve(listener, state, shutdown_signal()).await
}

/// Serve the gateway on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
