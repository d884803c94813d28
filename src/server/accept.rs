//! The accept loop.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::net::Accept;
use crate::server::supervisor::Supervisor;

/// Accept connections until `shutdown` fires, one task per connection.
///
/// Accept errors are logged and never end the loop. A dropped shutdown
/// sender counts as a shutdown.
pub async fn accept_loop<L>(
    mut listener: L,
    supervisor: Arc<Supervisor>,
    mut shutdown: broadcast::Receiver<()>,
) where
    L: Accept,
{
    loop {
        let accepted = tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::info!("Accept loop stopping");
                break;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((handshake, peer_addr)) => {
                let supervisor = Arc::clone(&supervisor);
                tokio::spawn(async move {
                    supervisor.serve_connection(handshake, peer_addr).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to accept connection");
            }
        }
    }
}
