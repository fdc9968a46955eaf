//! `ingate` entry point - the composition root.

use clap::Parser;

use ingate_cli::{GatewayArgs, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; flags and the real environment still apply.
    dotenvy::dotenv().ok();

    let args = GatewayArgs::parse();
    init_logging(args.log_level)?;

    let (config, server) = args.into_config()?;
    ingate_axum::start_server(config, server).await
}
