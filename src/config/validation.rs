//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, pool sizes > 0, status codes)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("buffer_pool.max_retained_capacity ({max}) is smaller than default_capacity ({default})")]
    RetainedCapacity { max: usize, default: usize },

    #[error("response.status {0} is not a valid HTTP status code")]
    Status(u16),
}

/// Check a deserialized config for values that cannot work at runtime.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.tls.cert_path.trim().is_empty() {
        errors.push(ValidationError::EmptyPath("listener.tls.cert_path"));
    }
    if config.listener.tls.key_path.trim().is_empty() {
        errors.push(ValidationError::EmptyPath("listener.tls.key_path"));
    }

    let positive = [
        ("timeouts.initial_idle_ms", config.timeouts.initial_idle_ms as usize),
        ("timeouts.idle_ms", config.timeouts.idle_ms as usize),
        ("buffer_pool.pool_size", config.buffer_pool.pool_size),
        ("buffer_pool.default_capacity", config.buffer_pool.default_capacity),
        ("buffer_pool.read_buffer_size", config.buffer_pool.read_buffer_size),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let pool = &config.buffer_pool;
    if pool.max_retained_capacity < pool.default_capacity {
        errors.push(ValidationError::RetainedCapacity {
            max: pool.max_retained_capacity,
            default: pool.default_capacity,
        });
    }

    if StatusCode::from_u16(config.response.status).is_err() {
        errors.push(ValidationError::Status(config.response.status));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
