//! Response buffer recycling.
//!
//! # Data Flow
//! ```text
//! Traffic handler needs to frame a response
//!     → pool.rs acquire() (recycled or freshly allocated, always empty)
//!     → response bytes written into the PooledBuffer
//!     → written to the connection
//!     → PooledBuffer dropped → buffer cleared and pushed back
//! ```
//!
//! # Design Decisions
//! - One pool per server, shared by every connection task
//! - Lock-free bounded queue; an empty pool falls back to allocation
//! - Release happens in `Drop`, so early returns cannot leak a checkout

pub mod pool;

pub use pool::{BufferPool, PooledBuffer};
