//! ftserver - Entry Point
//!
//! Serves directory listings and files over a control/data channel pair.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use ftserver::{Server, ServerConfig};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ftserver")]
#[command(version = "0.1.0")]
#[command(about = "A simple dual-channel file server", long_about = None)]
struct CliArgs {
    /// Port to listen on for control connections
    port: u16,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    let config = match ServerConfig::load(args.port, args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("File server starting...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    server.run(shutdown_signal()).await;
    ExitCode::SUCCESS
}

/// Resolves on Ctrl-C / SIGINT.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the interrupt signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Interrupt received");
}
