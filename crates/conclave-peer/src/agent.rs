use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use conclave_core::protocol;
use conclave_types::{ConclaveError, PeerId, RegisterRequest, Result};

use crate::classifier::Classifier;

/// One inference peer: registers itself with the coordinator, then serves
/// one task per inbound connection. The classifier is the only shared
/// state.
pub struct PeerAgent {
    id: PeerId,
    port: u16,
    coordinator: String,
    classifier: Arc<dyn Classifier>,
}

impl PeerAgent {
    pub fn new(
        id: impl Into<PeerId>,
        port: u16,
        coordinator: impl Into<String>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            id: id.into(),
            port,
            coordinator: coordinator.into(),
            classifier,
        }
    }

    /// Announce this peer to the coordinator: one connection, the
    /// registration JSON, then close. No acknowledgement is awaited. An
    /// unreachable coordinator is fatal to the agent.
    pub async fn register(&self) -> Result<()> {
        let mut stream = TcpStream::connect(&self.coordinator).await.map_err(|e| {
            ConclaveError::PeerUnreachable(format!("coordinator at {}: {e}", self.coordinator))
        })?;

        let request = RegisterRequest {
            id: self.id.clone(),
            port: self.port,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| ConclaveError::Serialization(e.to_string()))?;

        stream.write_all(&payload).await?;
        stream.shutdown().await?;
        tracing::info!(
            "Peer {} registered with coordinator at {}",
            self.id,
            self.coordinator
        );
        Ok(())
    }

    /// Bind the task listener on the advertised port and serve forever.
    pub async fn serve(&self) -> Result<()> {
        let listener = TcpListener::bind(("127.0.0.1", self.port)).await?;
        tracing::info!("Peer {} listening on port {}", self.id, self.port);
        self.serve_on(listener).await
    }

    /// Serve tasks from an already-bound listener. Each connection carries
    /// exactly one task and is handled on its own task; a malformed frame
    /// drops that connection and nothing else.
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, remote) = listener.accept().await?;
            let classifier = self.classifier.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_task(stream, classifier).await {
                    tracing::warn!("Task connection from {remote} failed: {e}");
                }
            });
        }
    }
}

/// Serve a single task: read the framed image, classify it off the async
/// runtime, write the bare label back, close.
async fn handle_task<S>(mut stream: S, classifier: Arc<dyn Classifier>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (header, image) = protocol::read_task(&mut stream).await?;
    tracing::debug!("Task received: {} byte(s)", header.size);

    let label = tokio::task::spawn_blocking(move || classifier.classify(&image))
        .await
        .map_err(|e| ConclaveError::Classifier(format!("classifier panicked: {e}")))??;

    stream.write_all(label.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use tokio::io::AsyncReadExt;

    use crate::classifier::FixedClassifier;

    fn fixed(label: &str) -> Arc<dyn Classifier> {
        Arc::new(FixedClassifier::new(label))
    }

    #[tokio::test]
    async fn test_handle_task_replies_with_label() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);

        let worker = tokio::spawn(handle_task(server, fixed("4")));
        protocol::send_task(&mut client, &[9u8; 128]).await.unwrap();

        let label = protocol::read_label(&mut client).await.unwrap();
        assert_eq!(label, "4");
        worker.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_handle_task_rejects_garbage_header() {
        let (mut client, server) = tokio::io::duplex(1024);

        let worker = tokio::spawn(handle_task(server, fixed("4")));
        client.write_all(b"not a header\n").await.unwrap();
        client.shutdown().await.unwrap();

        let result = worker.await.unwrap();
        assert!(matches!(result, Err(ConclaveError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_serve_survives_a_malformed_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let agent = PeerAgent::new("p1", addr.port(), "127.0.0.1:1", fixed("9"));
        tokio::spawn(async move {
            let _ = agent.serve_on(listener).await;
        });

        // First connection sends garbage and is dropped.
        let mut bad = TcpStream::connect(addr).await.unwrap();
        bad.write_all(b"garbage\n").await.unwrap();
        bad.shutdown().await.unwrap();
        let mut sink = Vec::new();
        let _ = bad.read_to_end(&mut sink).await;

        // The listener still serves the next task.
        let mut good = TcpStream::connect(addr).await.unwrap();
        protocol::send_task(&mut good, b"img").await.unwrap();
        let label = protocol::read_label(&mut good).await.unwrap();
        assert_eq!(label, "9");
    }

    #[tokio::test]
    async fn test_register_sends_the_advertised_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let agent = PeerAgent::new("p7", 9123, addr.to_string(), fixed("0"));

        let accept = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).await.unwrap();
            buf
        });

        agent.register().await.unwrap();

        let payload = accept.await.unwrap();
        let request: RegisterRequest = serde_json::from_slice(&payload).unwrap();
        assert_eq!(request.id, "p7");
        assert_eq!(request.port, 9123);
    }

    #[tokio::test]
    async fn test_register_against_dead_coordinator_fails() {
        // Bind then immediately drop to get an address nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        drop(listener);
        tokio::time::sleep(Duration::from_millis(20)).await;

        let agent = PeerAgent::new("p1", 9000, addr.to_string(), fixed("0"));
        let err = agent.register().await.unwrap_err();
        assert!(matches!(err, ConclaveError::PeerUnreachable(_)));
    }
}
