//! critic daemon - multi-persona code review service.
//!
//! A single Rust binary that:
//! - Lists Python files in a GitHub repository
//! - Reviews one file through a panel of LLM personas
//! - Condenses the critiques into an action plan or bullet summary

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use critic_daemon::config::Config;
use critic_daemon::server::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();

    info!("Starting critic daemon");
    info!(
        model = %config.model,
        origin = ?config.allowed_origin,
        github_token = config.github_token.is_some(),
        "Configuration loaded"
    );

    let state = AppState::from_config(&config).context("Failed to build HTTP clients")?;
    let router = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("critic daemon listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("critic daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
