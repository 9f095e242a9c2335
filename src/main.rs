// flight-search-proxy: keeps upstream API credentials server-side and serves
// flight-offer and location searches to the browser client

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;

use flight_search_proxy::config::ConfigSource;
use flight_search_proxy::{build_app, telemetry, AppState, ProxyConfig};

#[derive(Debug, Parser)]
#[command(name = "flight-search-proxy", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "flight-proxy.toml", env = "FLIGHT_PROXY_CONFIG")]
    config: PathBuf,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = ProxyConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.server.log_level = level;
    }

    telemetry::init_tracing(&config.server.log_level);
    if source == ConfigSource::Defaults {
        tracing::info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let state = AppState::from_config(&config.upstream)?;
    let app = build_app(state, &config.server.cors_origin)?;

    let address = config.server.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!(%address, upstream = %config.upstream.base_url, "flight-search-proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        wait_for_signal("Ctrl+C", signal::ctrl_c().await).await;
    };

    #[cfg(unix)]
    let terminate = async {
        let received = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                Ok(())
            }
            Err(e) => Err(e),
        };
        wait_for_signal("SIGTERM", received).await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

// A listener that could not be installed never fires, so it cannot end the server early
async fn wait_for_signal(name: &str, received: std::io::Result<()>) {
    if let Err(e) = received {
        tracing::warn!(signal = name, error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
