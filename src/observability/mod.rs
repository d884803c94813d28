//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with connection_id / peer_addr fields
//!     → logging.rs (filter, format, non-blocking stdout writer)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Connection ID flows through every per-connection event
//! - No metrics; log lines are the only output

pub mod logging;

pub use logging::init_logging;
