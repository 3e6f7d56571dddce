//! File-offer coordination and relay streaming.
//!
//! For each room member other than the offering sender, a worker task
//! arms a reply slot, forwards the offer, and waits for the recipient's
//! answer under the configured timeout. Acceptors get the file streamed
//! in chunk frames through their outbound queue; rejections, timeouts,
//! and send failures end that recipient's worker without touching the
//! others. The coordinator returns only once every worker finished, so
//! the dispatcher can tell the sender the transfer is complete.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use bytes::Bytes;
use roomcast_proto::{
    Command, Frame,
    payloads::{DownloadHeader, FileOffer},
};
use tokio::{fs, io::AsyncReadExt};

use crate::{ServerState, error::ServerError, registry::ClientId, responses::OfferOutcome};

/// Offer a file to every other member of the sender's room and relay it
/// to each acceptor, concurrently. Returns once all recipients are done.
pub(crate) async fn run_offer(
    state: Arc<ServerState>,
    sender: ClientId,
    request: FileOffer,
    path: PathBuf,
) {
    let members = state.rooms.members_of(sender);

    let mut workers = Vec::with_capacity(members.len());
    for recipient in members {
        if recipient == sender {
            continue;
        }

        let state = Arc::clone(&state);
        let request = request.clone();
        let path = path.clone();
        workers.push(tokio::spawn(async move {
            offer_to_recipient(&state, recipient, &request, &path).await;
        }));
    }

    for worker in workers {
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "offer worker failed");
        }
    }
}

/// One recipient's offer → reply → stream sequence.
async fn offer_to_recipient(
    state: &ServerState,
    recipient: ClientId,
    request: &FileOffer,
    path: &Path,
) {
    let waiter = state.responses.arm(recipient);

    let offer_frame = Frame::text(Command::FileOffer, request.encode());
    if !state.peers.send_to(recipient, offer_frame) {
        state.responses.disarm(recipient);
        tracing::warn!(client = recipient, "failed to send file offer");
        return;
    }

    let outcome = match tokio::time::timeout(state.config.offer_timeout, waiter).await {
        Err(_) => {
            state.responses.disarm(recipient);
            tracing::warn!("Timeout waiting for response from client {recipient}");
            return;
        },
        // Slot was overwritten by a newer offer to the same recipient;
        // this waiter is the abandoned one.
        Ok(Err(_)) => {
            tracing::debug!(client = recipient, "offer slot superseded");
            return;
        },
        Ok(Ok(outcome)) => outcome,
    };

    match outcome {
        OfferOutcome::Accepted => {
            if let Err(e) = stream_file(state, recipient, path, &request.filename).await {
                tracing::warn!(client = recipient, error = %e, "file relay aborted");
            }
        },
        OfferOutcome::Declined => {
            tracing::info!(client = recipient, file = %request.filename, "client rejected file");
        },
        OfferOutcome::Disconnected => {
            tracing::info!(client = recipient, "client disconnected before answering offer");
        },
    }
}

/// Stream one file to one acceptor: a `FileSize` frame announcing
/// `"<filename> <size>"`, then chunk frames until the remaining count
/// hits zero.
async fn stream_file(
    state: &ServerState,
    recipient: ClientId,
    path: &Path,
    filename: &str,
) -> Result<(), ServerError> {
    let mut file = fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    let header = DownloadHeader { filename: filename.to_string(), size };
    if !state.peers.send_to(recipient, Frame::text(Command::FileSize, header.encode())) {
        return Err(ServerError::Transport(format!("client {recipient} is gone")));
    }

    let mut remaining = size;
    let mut block = vec![0u8; state.config.chunk_size];
    while remaining > 0 {
        let want = remaining.min(block.len() as u64) as usize;
        file.read_exact(&mut block[..want]).await?;

        let chunk = Frame::new(Command::FileChunk, Bytes::copy_from_slice(&block[..want]));
        if !state.peers.send_to(recipient, chunk) {
            return Err(ServerError::Transport(format!("client {recipient} is gone")));
        }

        remaining -= want as u64;
    }

    tracing::info!(client = recipient, file = %filename, bytes = size, "file relayed");
    Ok(())
}
