//! Per-connection control loop.
//!
//! ```text
//! OPEN ──KeepOpen (deadline = now + idle)──▶ OPEN
//!   │
//!   └──CloseGraceful / CloseError──▶ CLOSED (stream shut down, guard dropped)
//! ```

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;

use crate::config::{ServerConfig, TimeoutConfig};
use crate::http::{Outcome, TrafficHandler};
use crate::net::{Connection, ConnectionTracker};

/// Why a connection reached `CLOSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// End of stream, or the client sent `Connection: close`.
    Graceful,
    /// No bytes arrived within the current idle window.
    IdleTimeout,
    /// Any other read or write failure.
    Io(io::ErrorKind),
}

impl From<&io::Error> for CloseReason {
    fn from(e: &io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => CloseReason::IdleTimeout,
            kind => CloseReason::Io(kind),
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::Graceful => write!(f, "graceful"),
            CloseReason::IdleTimeout => write!(f, "idle timeout"),
            CloseReason::Io(kind) => write!(f, "io error ({})", kind),
        }
    }
}

/// Drives every connection from accept to close.
///
/// One instance is shared (behind an `Arc`) by all connection tasks.
#[derive(Debug)]
pub struct Supervisor {
    handler: TrafficHandler,
    tracker: ConnectionTracker,
    initial_idle: Duration,
    idle: Duration,
    read_buffer_size: usize,
}

impl Supervisor {
    pub fn new(handler: TrafficHandler, timeouts: &TimeoutConfig, read_buffer_size: usize) -> Self {
        Self {
            handler,
            tracker: ConnectionTracker::new(),
            initial_idle: timeouts.initial_idle(),
            idle: timeouts.idle(),
            read_buffer_size,
        }
    }

    /// Build from a validated config and a ready handler.
    pub fn from_config(handler: TrafficHandler, config: &ServerConfig) -> Self {
        Self::new(handler, &config.timeouts, config.buffer_pool.read_buffer_size)
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn handler(&self) -> &TrafficHandler {
        &self.handler
    }

    /// Complete the handshake, then supervise the resulting stream.
    ///
    /// The handshake and the first request share the initial idle window.
    pub async fn serve_connection<H, S>(&self, handshake: H, peer_addr: SocketAddr) -> Option<CloseReason>
    where
        H: Future<Output = io::Result<S>>,
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let guard = self.tracker.track();
        let connection_id = guard.id();
        let deadline = Instant::now() + self.initial_idle;

        let stream = match tokio::time::timeout_at(deadline, handshake).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    peer_addr = %peer_addr,
                    error = %e,
                    "TLS handshake failed"
                );
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    peer_addr = %peer_addr,
                    "TLS handshake timed out"
                );
                return None;
            }
        };

        tracing::debug!(connection_id = %connection_id, peer_addr = %peer_addr, "Connection open");

        let mut conn = Connection::new(stream, peer_addr, guard, self.read_buffer_size);
        conn.set_read_deadline(deadline);
        Some(self.run(conn).await)
    }

    /// Supervise an established connection until it closes.
    pub async fn supervise<S>(&self, mut conn: Connection<S>) -> CloseReason
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        conn.set_read_deadline(Instant::now() + self.initial_idle);
        self.run(conn).await
    }

    async fn run<S>(&self, mut conn: Connection<S>) -> CloseReason
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let reason = loop {
            match self.handler.process(&mut conn).await {
                Outcome::KeepOpen => conn.set_read_deadline(Instant::now() + self.idle),
                Outcome::CloseGraceful => break CloseReason::Graceful,
                Outcome::CloseError(e) => {
                    tracing::trace!(connection_id = %conn.id(), error = %e, "Connection error");
                    break CloseReason::from(&e);
                }
            }
        };

        tracing::debug!(
            connection_id = %conn.id(),
            peer_addr = %conn.peer_addr(),
            reason = %reason,
            "Connection closed"
        );
        conn.close().await;
        reason
    }
}
