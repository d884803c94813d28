//! Server instance: shared state plus the listener that feeds it.
//!
//! # Data Flow
//! ```text
//! ServerConfig
//!     → Server::new (load TLS material, build pool + handler + supervisor)
//!     → Server::run (bind TlsListener)
//!     → accept.rs (accept loop, one task per connection)
//!     → supervisor.rs (handshake, idle windows, close)
//!     → http::TrafficHandler (one cycle per iteration)
//! ```
//!
//! # Design Decisions
//! - Shared state is an explicit `Arc<Supervisor>` handed to each task
//! - TLS config is loaded once and shared read-only
//! - Startup failures (TLS material, bind) are fatal and returned to the caller

pub mod accept;
pub mod supervisor;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_rustls::rustls::ServerConfig as RustlsServerConfig;

use crate::buffer::BufferPool;
use crate::config::ServerConfig;
use crate::http::{ResponseTemplate, TrafficHandler};
use crate::net::tls::{load_tls_config, server_config};
use crate::net::{Accept, ListenerError, TlsListener};

pub use accept::accept_loop;
pub use supervisor::{CloseReason, Supervisor};

/// Fatal startup errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("load x509 key pair: {0}")]
    Tls(#[source] std::io::Error),

    #[error("listener start: {0}")]
    Listen(#[from] ListenerError),

    #[error("invalid response status {0}")]
    Status(u16),
}

/// The TLS listener and everything its connections share.
pub struct Server {
    supervisor: Arc<Supervisor>,
    tls: Arc<RustlsServerConfig>,
    bind_address: String,
    drain_timeout: Duration,
}

impl Server {
    /// Load certificate material and build the shared state.
    pub async fn new(config: &ServerConfig) -> Result<Self, ServerError> {
        let tls_config = &config.listener.tls;
        let rustls = load_tls_config(
            Path::new(&tls_config.cert_path),
            Path::new(&tls_config.key_path),
        )
        .await
        .map_err(ServerError::Tls)?;

        Self::with_tls(config, server_config(&rustls))
    }

    /// Build the shared state around an already constructed rustls config.
    pub fn with_tls(config: &ServerConfig, tls: Arc<RustlsServerConfig>) -> Result<Self, ServerError> {
        let response = ResponseTemplate::from_config(&config.response)
            .map_err(|_| ServerError::Status(config.response.status))?;
        let handler = TrafficHandler::new(BufferPool::from_config(&config.buffer_pool), response);

        Ok(Self {
            supervisor: Arc::new(Supervisor::from_config(handler, config)),
            tls,
            bind_address: config.listener.bind_address.clone(),
            drain_timeout: config.timeouts.drain_timeout(),
        })
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TlsListener, ServerError> {
        Ok(TlsListener::bind(&self.bind_address, Arc::clone(&self.tls)).await?)
    }

    /// Bind, then serve until `shutdown` fires.
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        tracing::info!(address = %self.bind_address, "Listening (HTTPS)");
        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serve an already bound listener until `shutdown` fires, then wait for
    /// open connections up to the drain timeout.
    pub async fn serve<L>(&self, listener: L, shutdown: broadcast::Receiver<()>)
    where
        L: Accept,
    {
        accept_loop(listener, Arc::clone(&self.supervisor), shutdown).await;

        let tracker = self.supervisor.tracker();
        let open = tracker.active_count();
        if open > 0 {
            tracing::info!(open_connections = open, "Waiting for connections to close");
        }
        if !tracker.wait_idle(self.drain_timeout).await {
            tracing::warn!(
                open_connections = tracker.active_count(),
                "Drain timeout elapsed with connections still open"
            );
        }
        tracing::info!("Server stopped");
    }
}
