//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration and apply command-line overrides
//! - Validate the result once, after overrides
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing config file path means defaults, not an error

use std::path::Path;

use crate::config::{read_config, validate_config, ConfigError, ServerConfig};

/// Values given on the command line; `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    pub log_level: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind_address) = &self.bind_address {
            config.listener.bind_address = bind_address.clone();
        }
        if let Some(cert_path) = &self.cert_path {
            config.listener.tls.cert_path = cert_path.clone();
        }
        if let Some(key_path) = &self.key_path {
            config.listener.tls.key_path = key_path.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.observability.log_level = log_level.clone();
        }
    }
}

/// Build the effective configuration for this process.
pub fn resolve_config(path: Option<&Path>, overrides: &Overrides) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServerConfig::default(),
    };
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = resolve_config(None, &Overrides::default()).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8443");
    }

    #[test]
    fn overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:1"

            [listener.tls]
            cert_path = "file-cert.pem"
            key_path = "file-key.pem"
            "#
        )
        .unwrap();

        let overrides = Overrides {
            bind_address: Some("127.0.0.1:8443".into()),
            key_path: Some("cli-key.pem".into()),
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert_eq!(config.listener.tls.cert_path, "file-cert.pem");
        assert_eq!(config.listener.tls.key_path, "cli-key.pem");
    }

    #[test]
    fn override_can_repair_invalid_file_value() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"nowhere\"").unwrap();

        let overrides = Overrides {
            bind_address: Some("0.0.0.0:9443".into()),
            ..Default::default()
        };
        assert!(resolve_config(Some(file.path()), &overrides).is_ok());
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = Overrides {
            bind_address: Some("nowhere".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }
}
