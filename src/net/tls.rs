//! TLS configuration and certificate loading.

use std::path::Path;
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use tokio_rustls::rustls::crypto::aws_lc_rs;
use tokio_rustls::rustls::ServerConfig;

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    // Basic validation
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    ensure_crypto_provider();
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// The rustls server config shared by every accepted connection.
pub fn server_config(config: &RustlsConfig) -> Arc<ServerConfig> {
    config.get_inner()
}

/// Install aws-lc-rs as the process default provider if none is set yet.
pub fn ensure_crypto_provider() {
    // Err means another provider was installed first, which is fine.
    let _ = aws_lc_rs::default_provider().install_default();
}
