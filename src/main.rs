//! Skopos Binary Entry Point
//!
//! Parses the command line, initializes tracing, optionally detaches from
//! the terminal, then wires registry + forwarder into the agent loop.
//! Startup failures exit non-zero; once the loop is running, only a
//! signal stops the process.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use daemonize::Daemonize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skopos::{Agent, CollectorRegistry, Forwarder};

/// Skopos - Lightweight Telemetry Agent
#[derive(Parser, Debug)]
#[command(name = "skopos", version, about, long_about = None)]
struct Cli {
    /// Time between collection cycles (e.g. "30s", "5m")
    #[arg(short, long, default_value = "30s", env = "SKOPOS_INTERVAL")]
    interval: humantime::Duration,

    /// Path to the collector configuration file
    #[arg(short, long, default_value = "/etc/skopos.conf", env = "SKOPOS_CONFIG")]
    config: PathBuf,

    /// Broker push endpoint
    #[arg(
        short,
        long,
        default_value = "tcp://127.0.0.1:2999",
        env = "SKOPOS_ENDPOINT"
    )]
    endpoint: String,

    /// Stay attached to the terminal instead of daemonizing
    #[arg(short = 'F', long)]
    foreground: bool,

    /// Enable verbose diagnostic logging
    #[arg(short = 'D', long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Detach before the runtime exists; forking afterwards is unsound.
    if !cli.foreground {
        Daemonize::new().working_directory("/").start()?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Skopos - Lightweight Telemetry Agent");

    tracing::info!(config = %cli.config.display(), "loading collector registry");
    let registry = CollectorRegistry::load(&cli.config)?;
    if registry.is_empty() {
        tracing::warn!(config = %cli.config.display(), "no collectors configured");
    }

    let forwarder = Forwarder::connect(&cli.endpoint).await?;

    let interval: Duration = cli.interval.into();
    let mut agent = Agent::new(registry, forwarder, interval, cli.foreground);

    tokio::select! {
        _ = agent.run() => {}
        _ = shutdown_signal() => {}
    }

    agent.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("received terminate signal");
        }
    }
}
