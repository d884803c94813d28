//! TLS listener implementation.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Hand back the TLS handshake as a future so the accept loop never waits on it
//! - Graceful handling of accept errors

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(io::Error),
    /// Failed to accept connection.
    Accept(io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "Failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind(e) | ListenerError::Accept(e) => Some(e),
        }
    }
}

/// A source of incoming connections for the accept loop.
///
/// `accept` yields a handshake future rather than a finished stream. The
/// connection task drives it, so a slow peer only delays itself.
pub trait Accept: Send {
    /// Stream produced once the handshake completes.
    type Io: AsyncRead + AsyncWrite + Unpin + Send + 'static;
    /// Handshake future driven inside the connection task.
    type Handshake: Future<Output = io::Result<Self::Io>> + Send + 'static;

    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<(Self::Handshake, SocketAddr), ListenerError>> + Send;
}

/// A TCP listener that terminates TLS on every accepted connection.
pub struct TlsListener {
    /// The underlying TCP listener.
    inner: TcpListener,
    /// Shared, read-only TLS configuration.
    acceptor: TlsAcceptor,
}

impl TlsListener {
    /// Bind to `bind_address` and serve TLS with `tls`.
    pub async fn bind(bind_address: &str, tls: Arc<ServerConfig>) -> Result<Self, ListenerError> {
        let addr: SocketAddr = bind_address
            .parse()
            .map_err(|e| ListenerError::Bind(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;

        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self {
            inner: listener,
            acceptor: TlsAcceptor::from(tls),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.inner.local_addr()
    }
}

impl Accept for TlsListener {
    type Io = TlsStream<TcpStream>;
    type Handshake = tokio_rustls::Accept<TcpStream>;

    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<(Self::Handshake, SocketAddr), ListenerError>> + Send {
        async move {
            let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(peer_addr = %addr, error = %e, "Failed to set TCP_NODELAY");
            }

            tracing::debug!(peer_addr = %addr, "Connection accepted");

            Ok((self.acceptor.accept(stream), addr))
        }
    }
}
