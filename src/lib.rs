//! TLS listener that answers every request with a fixed response and drops
//! idle connections.

pub mod buffer;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod server;

pub use config::schema::ServerConfig;
pub use lifecycle::Shutdown;
pub use server::{Server, ServerError};
