//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Connection (one read)
//!     → request.rs (parse head, detect Connection: close)
//!     → response.rs (frame status/body into a pooled buffer)
//!     → handler.rs (one write, decide keep-open vs close)
//! ```

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{Outcome, TrafficHandler};
pub use request::{parse_head, ParseError, RequestHead};
pub use response::{ResponseTemplate, BAD_REQUEST_FALLBACK};
