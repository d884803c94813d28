//! Response framing.
//!
//! # Responsibilities
//! - Encode the configured status/body pair into a caller-supplied buffer
//! - Stamp a `Date` header on every framed response
//! - Provide the fixed fallback for unparseable requests
//!
//! # Design Decisions
//! - Encoding writes into a pooled `BytesMut`, never allocating per response
//! - The 400 fallback is a static literal and carries no `Date`

use std::fmt::{self, Write as _};
use std::time::SystemTime;

use bytes::{Bytes, BytesMut};
use http::StatusCode;
use httpdate::HttpDate;

use crate::config::ResponseConfig;

/// Sent verbatim when a request cannot be parsed.
pub const BAD_REQUEST_FALLBACK: &[u8] = b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n";

/// The fixed status/body pair answered to every parsed request.
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    status: StatusCode,
    body: Bytes,
}

impl ResponseTemplate {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A status-only response (`Content-Length: 0`).
    pub fn status_only(status: StatusCode) -> Self {
        Self::new(status, Bytes::new())
    }

    pub fn from_config(config: &ResponseConfig) -> Result<Self, http::status::InvalidStatusCode> {
        let status = StatusCode::from_u16(config.status)?;
        Ok(Self::new(status, config.body.clone()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Append the full response to `buf`, dated `now`.
    pub fn encode(&self, buf: &mut BytesMut, now: SystemTime) -> fmt::Result {
        buf.reserve(96 + self.body.len());
        write!(
            buf,
            "HTTP/1.1 {} {}\r\n",
            self.status.as_str(),
            self.status.canonical_reason().unwrap_or("")
        )?;
        write!(buf, "Content-Length: {}\r\n", self.body.len())?;
        write!(buf, "Date: {}\r\n", HttpDate::from(now))?;
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);
        Ok(())
    }
}

impl Default for ResponseTemplate {
    fn default() -> Self {
        Self::status_only(StatusCode::OK)
    }
}
