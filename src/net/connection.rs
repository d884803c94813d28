//! Connection wrapper and lifecycle tracking.
//!
//! # Responsibilities
//! - Own one accepted stream exclusively for its lifetime
//! - One deadline-bounded read per request, whole-message writes
//! - Generate unique connection IDs for tracing
//! - Count live connections so shutdown can wait for them

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An accepted byte stream plus the per-connection read state.
///
/// The supervisor owns a `Connection` by value, so no two tasks can ever touch
/// the same stream. Dropping it releases the socket; [`Connection::close`]
/// additionally shuts the write side down cleanly first.
pub struct Connection<S> {
    stream: S,
    peer_addr: SocketAddr,
    read_buf: BytesMut,
    read_buffer_size: usize,
    read_deadline: Option<Instant>,
    guard: ConnectionGuard,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        stream: S,
        peer_addr: SocketAddr,
        guard: ConnectionGuard,
        read_buffer_size: usize,
    ) -> Self {
        Self {
            stream,
            peer_addr,
            read_buf: BytesMut::with_capacity(read_buffer_size),
            read_buffer_size,
            read_deadline: None,
            guard,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.guard.id()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Set the absolute time after which a pending read fails with `TimedOut`.
    pub fn set_read_deadline(&mut self, deadline: Instant) {
        self.read_deadline = Some(deadline);
    }

    pub fn read_deadline(&self) -> Option<Instant> {
        self.read_deadline
    }

    /// Perform exactly one read.
    ///
    /// Returns `Ok(None)` on a clean end of stream. Passing the read deadline
    /// yields an `io::ErrorKind::TimedOut` error.
    pub async fn read(&mut self) -> io::Result<Option<&[u8]>> {
        self.read_buf.clear();
        self.read_buf.reserve(self.read_buffer_size);

        let read = self.stream.read_buf(&mut self.read_buf);
        let n = match self.read_deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, read)
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "read deadline exceeded"))??,
            None => read.await?,
        };

        if n == 0 {
            return Ok(None);
        }
        Ok(Some(&self.read_buf[..n]))
    }

    /// Write the whole message and flush it.
    pub async fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Shut the stream down and release it.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::trace!(
                connection_id = %self.guard.id(),
                error = %e,
                "Shutdown of closed connection failed"
            );
        }
    }
}

/// Tracks active connections for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    /// Current count of active connections.
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    /// Create a new connection tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    /// Get current active connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until all connections are closed or `timeout` elapses.
    ///
    /// Returns `true` if the count reached zero in time.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.active_count() > 0 {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        true
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(connection_id = %self.id, "Connection released");
    }
}
