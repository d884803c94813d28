//! TLS idle-timeout server
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──TLS──▶ net::TlsListener ──▶ server::accept_loop ──spawn──▶ server::Supervisor
//!                                                                          │   ▲
//!                                            read (idle deadline)          ▼   │ KeepOpen
//!                                                                 http::TrafficHandler
//!                                                                          │
//!                                          buffer::BufferPool ◀── frame ──┘── one write
//! ```
//!
//! Cross-cutting: `config` (TOML + CLI overrides), `observability` (tracing),
//! `lifecycle` (signals, shutdown, drain).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tls_idle_server::lifecycle::signals::spawn_signal_listener;
use tls_idle_server::lifecycle::{resolve_config, Overrides, Shutdown};
use tls_idle_server::observability::init_logging;
use tls_idle_server::Server;

#[derive(Parser, Debug)]
#[command(name = "tls-idle-server")]
#[command(author, version, about = "Minimal TLS listener with idle-connection timeouts", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:8443
    #[arg(short, long)]
    bind: Option<String>,

    /// PEM certificate file
    #[arg(long)]
    cert: Option<String>,

    /// PEM private key file
    #[arg(long)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = Overrides {
        bind_address: cli.bind,
        cert_path: cli.cert,
        key_path: cli.key,
        log_level: cli.log_level,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    let _log_guard = init_logging(&config.observability)?;

    tracing::info!("tls-idle-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        initial_idle_ms = config.timeouts.initial_idle_ms,
        idle_ms = config.timeouts.idle_ms,
        "Configuration loaded"
    );

    let server = Server::new(&config).await?;

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    spawn_signal_listener(Arc::clone(&shutdown));

    server.run(receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
