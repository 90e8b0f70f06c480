//! sums-server - Main entry point
//!
//! Resolves configuration (CLI/env, then TOML file, then defaults), initializes
//! tracing, and serves the pipeline until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sums_common::config::{
    load_from_sources, CliOverrides, ConfigSource, ServiceConfig, CONFIG_ENV_VAR,
};
use sums_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sums-server
#[derive(Parser, Debug)]
#[command(name = "sums-server")]
#[command(about = "Content-addressed integer sums service")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "SUMS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SUMS_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SUMS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, source) = load_from_sources(args.config.as_deref(), CONFIG_ENV_VAR)
        .context("Failed to load configuration")?;
    let overrides = CliOverrides {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    };
    let config = ServiceConfig::resolve(&overrides, toml_config.as_ref())
        .context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "sums_server={0},sums_common={0},tower_http={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sums-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Missing(path) => {
            warn!("Config file {} not found, using defaults", path.display())
        }
        ConfigSource::None => info!("No config file location available, using defaults"),
    }

    let state = AppState::new().context("Failed to build request pipeline")?;
    info!(bindings = state.pipeline.len(), "Request pipeline ready");

    let app = build_router(state, config.max_body_bytes);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
