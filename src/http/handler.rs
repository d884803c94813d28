//! One read → parse → respond cycle on a connection.

use std::io;
use std::time::SystemTime;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::buffer::BufferPool;
use crate::http::request::parse_head;
use crate::http::response::{ResponseTemplate, BAD_REQUEST_FALLBACK};
use crate::net::Connection;

/// What the supervisor should do after a cycle.
#[derive(Debug)]
pub enum Outcome {
    /// Reset the idle window and run another cycle.
    KeepOpen,
    /// The peer finished cleanly or asked for `Connection: close`.
    CloseGraceful,
    /// Read or write failure, including an expired read deadline.
    CloseError(io::Error),
}

/// Runs request cycles against connections, framing responses in pooled buffers.
#[derive(Debug)]
pub struct TrafficHandler {
    pool: BufferPool,
    response: ResponseTemplate,
}

impl TrafficHandler {
    pub fn new(pool: BufferPool, response: ResponseTemplate) -> Self {
        Self { pool, response }
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Perform exactly one read, at most one parse and exactly one write.
    pub async fn process<S>(&self, conn: &mut Connection<S>) -> Outcome
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let connection_id = conn.id();

        let data = match conn.read().await {
            Ok(Some(data)) => data,
            Ok(None) => return Outcome::CloseGraceful,
            Err(e) => return Outcome::CloseError(e),
        };

        let head = match parse_head(data) {
            Ok(head) => head,
            Err(e) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    peer_addr = %conn.peer_addr(),
                    error = %e,
                    "Failed to parse HTTP request"
                );
                return match conn.write(BAD_REQUEST_FALLBACK).await {
                    Ok(()) => Outcome::KeepOpen,
                    Err(e) => Outcome::CloseError(e),
                };
            }
        };

        tracing::trace!(
            connection_id = %connection_id,
            method = %head.method,
            path = %head.path,
            "Request parsed"
        );

        let mut buf = self.pool.acquire();
        if let Err(e) = self.response.encode(&mut buf, SystemTime::now()) {
            return Outcome::CloseError(io::Error::other(e));
        }
        if let Err(e) = conn.write(&buf).await {
            return Outcome::CloseError(e);
        }

        if head.close_requested {
            Outcome::CloseGraceful
        } else {
            Outcome::KeepOpen
        }
    }
}
