//! vcsnav server entrypoint.
//!
//! Loads the provider configuration, builds the proxy router and serves it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vcsnav_server::{build_router, AppState, ServerSettings};

#[derive(Parser)]
#[command(author, version, about = "VCS repository browsing proxy", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short, default_value = "vcsnav.yaml", env = "VCSNAV_CONFIG")]
    config: PathBuf,

    /// Listen address, overriding the configuration file
    #[arg(long, env = "VCSNAV_LISTEN")]
    listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "VCSNAV_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().context("invalid RUST_LOG environment variable")?
    } else {
        EnvFilter::new(format!(
            "vcsnav_server={level},vcsnav_providers={level},tower_http=warn",
            level = cli.log_level
        ))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = ServerSettings::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let listen = cli.listen.unwrap_or_else(|| settings.listen.clone());
    info!(
        providers = settings.vcs.len(),
        "starting vcsnav server on {}", listen
    );

    let state = Arc::new(AppState::new(settings.vcs));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
