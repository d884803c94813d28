//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the TLS listener.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Idle windows and shutdown drain.
    pub timeouts: TimeoutConfig,

    /// Response buffer pool sizing.
    pub buffer_pool: BufferPoolConfig,

    /// Fixed response sent for every well-formed request.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Certificate and key material.
    pub tls: TlsConfig,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            tls: TlsConfig::default(),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "cert.pem".to_string(),
            key_path: "key.pem".to_string(),
        }
    }
}

/// Idle-timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Read window for the first request on a fresh connection, in milliseconds.
    pub initial_idle_ms: u64,

    /// Read window after each completed request, in milliseconds.
    pub idle_ms: u64,

    /// How long shutdown waits for open connections, in milliseconds.
    pub drain_timeout_ms: u64,
}

impl TimeoutConfig {
    pub fn initial_idle(&self) -> Duration {
        Duration::from_millis(self.initial_idle_ms)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            initial_idle_ms: 5_000,
            idle_ms: 3_000,
            drain_timeout_ms: 5_000,
        }
    }
}

/// Buffer sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferPoolConfig {
    /// Maximum number of idle response buffers kept for reuse.
    pub pool_size: usize,

    /// Initial capacity of a freshly allocated response buffer.
    pub default_capacity: usize,

    /// Buffers that grew beyond this are dropped instead of recycled.
    pub max_retained_capacity: usize,

    /// Size of each connection's read buffer (one read per request).
    pub read_buffer_size: usize,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: 1024,
            default_capacity: 256,
            max_retained_capacity: 16 * 1024,
            read_buffer_size: 4096,
        }
    }
}

/// The fixed status/body pair answered to every parsed request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// HTTP status code.
    pub status: u16,

    /// Response body; empty means a status-only response.
    pub body: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            status: 200,
            body: String::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Output format for log lines.
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8443");
        assert_eq!(config.timeouts.initial_idle(), Duration::from_secs(5));
        assert_eq!(config.timeouts.idle(), Duration::from_secs(3));
        assert_eq!(config.response.status, 200);
        assert!(config.response.body.is_empty());
        assert_eq!(config.observability.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener.tls]
            cert_path = "/etc/tls/server.crt"

            [timeouts]
            idle_ms = 750

            [observability]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.tls.cert_path, "/etc/tls/server.crt");
        assert_eq!(config.listener.tls.key_path, "key.pem");
        assert_eq!(config.timeouts.idle_ms, 750);
        assert_eq!(config.timeouts.initial_idle_ms, 5_000);
        assert_eq!(config.observability.format, LogFormat::Json);
    }
}
