use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};

use conclave_types::Result;

use crate::coordinator::Coordinator;
use crate::protocol;

/// Accept loop for the registration listener. Each connection is handled on
/// its own task so one slow or stuck client never blocks the others.
pub async fn serve(listener: TcpListener, coordinator: Arc<Coordinator>) -> Result<()> {
    loop {
        let (stream, remote) = listener.accept().await?;
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            handle_registration(stream, remote, coordinator).await;
        });
    }
}

async fn handle_registration(
    stream: TcpStream,
    remote: SocketAddr,
    coordinator: Arc<Coordinator>,
) {
    match protocol::read_register(stream, coordinator.registration_read_cap()).await {
        Ok(Some(request)) => {
            // The peer advertises the port it serves tasks on; the host is
            // whatever address it dialed in from.
            let addr = SocketAddr::new(remote.ip(), request.port);
            coordinator.register(request.id, addr).await;
        }
        Ok(None) => {
            tracing::debug!("Empty registration connection from {remote}, ignoring");
        }
        Err(e) => {
            tracing::warn!("Rejected registration from {remote}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::{TempDir, tempdir};
    use tokio::io::AsyncWriteExt;

    use crate::config::ConclaveConfig;

    async fn spawn_server() -> (SocketAddr, Arc<Coordinator>, TempDir) {
        let dir = tempdir().unwrap();
        let mut config = ConclaveConfig::default();
        config.metrics_path = dir
            .path()
            .join("metrics.json")
            .to_string_lossy()
            .into_owned();

        let coordinator = Arc::new(Coordinator::new(&config));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = coordinator.clone();
        tokio::spawn(async move {
            let _ = serve(listener, server).await;
        });
        (addr, coordinator, dir)
    }

    async fn wait_for_peers(coordinator: &Coordinator, count: usize) {
        for _ in 0..100 {
            if coordinator.peers().await.len() == count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("registry never reached {count} peer(s)");
    }

    #[tokio::test]
    async fn test_registers_peer_with_advertised_port() {
        let (addr, coordinator, _dir) = spawn_server().await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(br#"{"id": "p1", "port": 9100}"#)
            .await
            .unwrap();
        stream.shutdown().await.unwrap();

        wait_for_peers(&coordinator, 1).await;
        let peers = coordinator.peers().await;
        assert_eq!(peers[0].id, "p1");
        assert_eq!(peers[0].addr.port(), 9100);
        assert_eq!(peers[0].addr.ip().to_string(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_empty_connection_is_ignored() {
        let (addr, coordinator, _dir) = spawn_server().await;

        // A probe that connects and closes without sending anything.
        let stream = TcpStream::connect(addr).await.unwrap();
        drop(stream);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(br#"{"id": "p1", "port": 9100}"#)
            .await
            .unwrap();
        stream.shutdown().await.unwrap();

        wait_for_peers(&coordinator, 1).await;
        assert_eq!(coordinator.peers().await.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let (addr, coordinator, _dir) = spawn_server().await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"not json at all").await.unwrap();
        stream.shutdown().await.unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(br#"{"id": "p2", "port": 9200}"#)
            .await
            .unwrap();
        stream.shutdown().await.unwrap();

        wait_for_peers(&coordinator, 1).await;
        let peers = coordinator.peers().await;
        assert_eq!(peers[0].id, "p2");
    }
}
