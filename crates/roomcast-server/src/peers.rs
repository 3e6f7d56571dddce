//! Per-connection outbound queues.
//!
//! Frames reach a client's socket from several tasks at once: its own
//! session (responses to its requests), other sessions (broadcasts), and
//! offer workers (file streams). Each connection therefore gets one
//! unbounded queue drained by a single writer task, which keeps every
//! frame atomic on the wire without a per-socket send mutex.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use bytes::BytesMut;
use roomcast_proto::Frame;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::registry::ClientId;

/// Map of connected clients to their outbound queues, self-synchronized.
#[derive(Debug, Default)]
pub(crate) struct PeerMap {
    peers: Mutex<HashMap<ClientId, mpsc::UnboundedSender<Frame>>>,
}

impl PeerMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, mpsc::UnboundedSender<Frame>>> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection and hand back the receiving side of its
    /// queue, to be drained by [`write_outbound`].
    pub(crate) fn register(&self, client: ClientId) -> mpsc::UnboundedReceiver<Frame> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(client, tx);
        rx
    }

    /// Drop a connection's queue. The writer task drains what was already
    /// queued and then exits.
    pub(crate) fn unregister(&self, client: ClientId) {
        self.lock().remove(&client);
    }

    /// Queue a frame for one client.
    ///
    /// Returns `false` if the client is gone; callers log and move on.
    pub(crate) fn send_to(&self, client: ClientId, frame: Frame) -> bool {
        match self.lock().get(&client) {
            Some(tx) => tx.send(frame).is_ok(),
            None => false,
        }
    }
}

/// Writer task: drain a connection's queue onto its socket.
///
/// Runs until the queue closes (connection unregistered) or a write
/// fails. Each frame is encoded and written whole, preserving frame
/// boundaries on the shared socket.
pub(crate) async fn write_outbound<W: AsyncWrite + Unpin>(
    mut io: W,
    mut queue: mpsc::UnboundedReceiver<Frame>,
) {
    let mut buf = BytesMut::with_capacity(8 * 1024);

    while let Some(frame) = queue.recv().await {
        buf.clear();
        if let Err(e) = frame.encode(&mut buf) {
            tracing::warn!(error = %e, "dropping unencodable frame");
            continue;
        }
        if let Err(e) = io.write_all(&buf).await {
            tracing::debug!(error = %e, "outbound write failed");
            return;
        }
    }

    let _ = io.flush().await;
}
