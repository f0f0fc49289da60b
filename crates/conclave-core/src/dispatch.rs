use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::task::JoinSet;

use conclave_types::{ConclaveError, Label, PeerId, PeerRecord, Result};

use crate::protocol;

/// One request/response exchange with a single peer.
///
/// The production impl talks TCP; tests inject scripted fakes so dispatch
/// behavior is checked without sockets.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn exchange(&self, addr: SocketAddr, image: &[u8]) -> Result<Label>;
}

/// Production transport: connect, send the framed task, read the label.
pub struct TcpTransport;

#[async_trait]
impl PeerTransport for TcpTransport {
    async fn exchange(&self, addr: SocketAddr, image: &[u8]) -> Result<Label> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ConclaveError::PeerUnreachable(format!("{addr}: {e}")))?;
        protocol::send_task(&mut stream, image).await?;
        protocol::read_label(&mut stream).await
    }
}

/// Broadcast one image to every peer and wait for every outcome.
///
/// Each peer gets its own task bounded by `per_peer_timeout`; the call
/// returns only after all of them have finished; there is no early exit on
/// partial quorum. A failed or timed-out peer yields `None`; per-peer
/// failures are absorbed here and never surface to the caller.
pub async fn fan_out(
    transport: Arc<dyn PeerTransport>,
    peers: Vec<PeerRecord>,
    image: &[u8],
    per_peer_timeout: Duration,
) -> BTreeMap<PeerId, Option<Label>> {
    let image: Arc<[u8]> = Arc::from(image);
    let mut responses: BTreeMap<PeerId, Option<Label>> =
        peers.iter().map(|p| (p.id.clone(), None)).collect();

    let mut set = JoinSet::new();
    for peer in peers {
        let transport = transport.clone();
        let image = image.clone();
        set.spawn(async move {
            let outcome =
                tokio::time::timeout(per_peer_timeout, transport.exchange(peer.addr, &image))
                    .await;
            let label = match outcome {
                Ok(Ok(label)) => {
                    tracing::debug!("Peer {} responded with '{label}'", peer.id);
                    Some(label)
                }
                Ok(Err(e)) => {
                    tracing::warn!("Peer {} failed during dispatch: {e}", peer.id);
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        "Peer {} timed out after {}ms",
                        peer.id,
                        per_peer_timeout.as_millis()
                    );
                    None
                }
            };
            (peer.id, label)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((id, label)) => {
                responses.insert(id, label);
            }
            Err(e) => tracing::error!("Dispatch task failed to join: {e}"),
        }
    }

    responses
}
