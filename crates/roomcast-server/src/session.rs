//! Per-connection message dispatcher.
//!
//! One `Session` per accepted socket. Frames from a single connection are
//! handled strictly in order; a file offer blocks this connection's
//! dispatch until every recipient finished or timed out, so the sender's
//! completion reply comes last. Other connections keep flowing.
//!
//! Malformed payloads never kill the connection: they are logged and
//! answered with an [`Command::Unknown`] frame, and dispatch continues
//! with the next frame.

use std::sync::Arc;

use roomcast_proto::{
    Command, Frame,
    payloads::{ChatMessage, FileOffer, JoinRoom, OfferReply, UploadHeader},
};

use crate::{
    ServerState,
    files::{self, FileReception},
    offer,
    registry::ClientId,
    responses::OfferOutcome,
};

/// Per-connection dispatch context.
pub(crate) struct Session {
    id: ClientId,
    state: Arc<ServerState>,
    /// Upload in flight on this connection, if any. Owned exclusively by
    /// this task.
    reception: Option<FileReception>,
}

impl Session {
    pub(crate) fn new(id: ClientId, state: Arc<ServerState>) -> Self {
        Self { id, state, reception: None }
    }

    /// Route one decoded frame to its handler.
    pub(crate) async fn handle_frame(&mut self, frame: Frame) {
        self.state.stats.record(frame.raw_command());

        match frame.command() {
            Some(Command::JoinRoom) => self.handle_join(&frame),
            Some(Command::MessageText) => self.handle_chat(&frame),
            Some(Command::FileOffer) => self.handle_offer(&frame).await,
            Some(Command::FileSize) => self.handle_upload_open(&frame).await,
            Some(Command::FileChunk) => self.handle_chunk(&frame).await,
            Some(Command::FileOfferResponse) => self.handle_offer_reply(&frame),
            _ => {
                tracing::warn!(client = self.id, tag = frame.raw_command(), "unknown command");
                self.reply_unknown();
            },
        }
    }

    /// Drop any upload in flight. The partial file stays on disk; clients
    /// are expected to re-upload.
    pub(crate) fn abort_upload(&mut self) {
        if let Some(reception) = self.reception.take() {
            tracing::warn!(
                client = self.id,
                path = %reception.path().display(),
                received = reception.received(),
                expected = reception.expected(),
                "upload abandoned, partial file retained"
            );
        }
    }

    fn handle_join(&mut self, frame: &Frame) {
        let Some(join) = self.parse_or_unknown(JoinRoom::parse(&frame.payload)) else {
            return;
        };

        let old_room = self.state.rooms.join(self.id, join.room_id);
        tracing::info!(
            client = self.id,
            room = join.room_id,
            ?old_room,
            name = %join.client_name,
            "client joined room"
        );

        self.send(Frame::text(Command::JoinRoomResponse, "Joined room successfully."));
        self.broadcast(format!("CLIENT {} JOINED ROOM {}", join.client_name, join.room_id));
    }

    fn handle_chat(&mut self, frame: &Frame) {
        let Some(chat) = self.parse_or_unknown(ChatMessage::parse(&frame.payload)) else {
            return;
        };

        self.broadcast(format!("CLIENT {}: {}", chat.client_name, chat.text));
    }

    async fn handle_offer(&mut self, frame: &Frame) {
        let Some(request) = self.parse_or_unknown(FileOffer::parse(&frame.payload)) else {
            return;
        };

        let path = match files::upload_path(
            &self.state.config.files_root,
            &request.sender_name,
            &request.filename,
        ) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(client = self.id, error = %e, "rejecting file offer");
                self.reply_unknown();
                return;
            },
        };

        offer::run_offer(Arc::clone(&self.state), self.id, request, path).await;

        self.send(Frame::text(
            Command::MessageTextResponse,
            "File transfer complete to all clients.",
        ));
    }

    async fn handle_upload_open(&mut self, frame: &Frame) {
        let Some(header) = self.parse_or_unknown(UploadHeader::parse(&frame.payload)) else {
            return;
        };

        match FileReception::open(
            &self.state.config.files_root,
            &header.client_name,
            &header.filename,
            header.size,
        )
        .await
        {
            Ok(reception) if reception.is_complete() => {
                // Zero-byte upload: nothing further to receive.
                tracing::info!(client = self.id, path = %reception.path().display(), "upload complete");
                self.abort_upload();
            },
            Ok(reception) => {
                tracing::info!(
                    client = self.id,
                    path = %reception.path().display(),
                    size = header.size,
                    "upload opened"
                );
                self.abort_upload();
                self.reception = Some(reception);
            },
            Err(e) => {
                tracing::error!(client = self.id, error = %e, "failed to open upload");
            },
        }
    }

    async fn handle_chunk(&mut self, frame: &Frame) {
        let Some(reception) = self.reception.as_mut() else {
            tracing::warn!(client = self.id, "file chunk with no transfer state");
            return;
        };

        match reception.write_chunk(&frame.payload).await {
            Ok(true) => {
                tracing::info!(
                    client = self.id,
                    path = %reception.path().display(),
                    bytes = reception.received(),
                    "upload complete"
                );
                self.reception = None;
            },
            Ok(false) => {},
            Err(e) => {
                tracing::error!(client = self.id, error = %e, "upload aborted");
                self.abort_upload();
            },
        }
    }

    fn handle_offer_reply(&self, frame: &Frame) {
        let outcome = match OfferReply::parse(&frame.payload) {
            OfferReply::Accept => OfferOutcome::Accepted,
            OfferReply::Decline => OfferOutcome::Declined,
        };

        if !self.state.responses.fulfil(self.id, outcome) {
            tracing::debug!(client = self.id, "offer response with no armed waiter");
        }
    }

    /// Append to the room log and fan the message out to everyone else in
    /// the sender's room. Per-recipient failures are logged and skipped.
    fn broadcast(&self, message: String) {
        let members = self.state.rooms.record_broadcast(self.id, &message);
        let frame = Frame::text(Command::MessageTextResponse, message);

        for member in members {
            if member == self.id {
                continue;
            }
            if !self.state.peers.send_to(member, frame.clone()) {
                tracing::warn!(client = member, "broadcast send failed");
            }
        }
    }

    fn parse_or_unknown<T>(&self, parsed: roomcast_proto::Result<T>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(client = self.id, error = %e, "malformed payload");
                self.reply_unknown();
                None
            },
        }
    }

    fn reply_unknown(&self) {
        self.send(Frame::text(Command::Unknown, "Unknown command."));
    }

    fn send(&self, frame: Frame) {
        if !self.state.peers.send_to(self.id, frame) {
            tracing::debug!(client = self.id, "reply send failed, client gone");
        }
    }
}
