//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, yields a pending TLS handshake)
//!     → tls.rs (certificate material behind the handshake)
//!     → connection.rs (owned stream, read deadline, lifecycle tracking)
//!     → Hand off to the connection supervisor
//! ```
//!
//! # Design Decisions
//! - No admission control: every accepted connection gets its own task
//! - The handshake runs in the connection task, never in the accept loop
//! - Each connection tracked for graceful shutdown

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{Connection, ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Accept, ListenerError, TlsListener};
