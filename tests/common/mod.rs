//! Shared utilities for end-to-end tests over real TLS.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tls_idle_server::server::Supervisor;
use tls_idle_server::{Server, ServerConfig, Shutdown};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::crypto::aws_lc_rs;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// A self-signed certificate for `localhost`, written to a temp dir.
pub struct TestCert {
    _dir: TempDir,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub cert_der: CertificateDer<'static>,
}

pub fn generate_cert() -> TestCert {
    let generated = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let cert_path = dir.path().join("cert.pem");
    let key_path = dir.path().join("key.pem");
    std::fs::write(&cert_path, generated.cert.pem()).unwrap();
    std::fs::write(&key_path, generated.key_pair.serialize_pem()).unwrap();

    TestCert {
        _dir: dir,
        cert_path,
        key_path,
        cert_der: CertificateDer::from(generated.cert.der().to_vec()),
    }
}

/// A config pointing at `cert` with short idle windows, bound to an ephemeral port.
pub fn test_config(cert: &TestCert, initial_idle_ms: u64, idle_ms: u64) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.listener.tls.cert_path = cert.cert_path.display().to_string();
    config.listener.tls.key_path = cert.key_path.display().to_string();
    config.timeouts.initial_idle_ms = initial_idle_ms;
    config.timeouts.idle_ms = idle_ms;
    config.timeouts.drain_timeout_ms = 2_000;
    config
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub supervisor: Arc<Supervisor>,
    pub task: JoinHandle<()>,
}

/// Build, bind and spawn a server.
pub async fn start_server(config: ServerConfig) -> RunningServer {
    let server = Server::new(&config).await.unwrap();
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let supervisor = Arc::clone(server.supervisor());

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let task = tokio::spawn(async move {
        server.serve(listener, receiver).await;
    });

    RunningServer {
        addr,
        shutdown,
        supervisor,
        task,
    }
}

pub fn connector(cert: &TestCert) -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.add(cert.cert_der.clone()).unwrap();
    let config = ClientConfig::builder_with_provider(Arc::new(aws_lc_rs::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots)
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

pub async fn connect(addr: SocketAddr, connector: &TlsConnector) -> TlsStream<TcpStream> {
    let tcp = TcpStream::connect(addr).await.unwrap();
    let name = ServerName::try_from("localhost").unwrap();
    connector.connect(name, tcp).await.unwrap()
}

/// Read until a complete response head (and nothing more is pending) arrives.
pub async fn read_response(stream: &mut TlsStream<TcpStream>) -> String {
    let mut received = Vec::new();
    let mut chunk = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut chunk))
            .await
            .expect("response within 2s")
            .unwrap();
        assert!(n > 0, "connection closed before a response arrived");
        received.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(received).unwrap()
}

/// Wait for the server to close the connection. Returns false on timeout.
pub async fn closed_within(stream: &mut TlsStream<TcpStream>, limit: Duration) -> bool {
    let mut chunk = [0u8; 256];
    tokio::time::timeout(limit, async {
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    })
    .await
    .is_ok()
}
