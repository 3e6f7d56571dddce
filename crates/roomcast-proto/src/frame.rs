//! Frame type and command tags.
//!
//! A `Frame` is the transport-layer unit: one command byte plus an opaque
//! payload, length-prefixed on the wire. The payload is raw bytes here; the
//! text forms carried by most commands live in [`crate::payloads`].

use bytes::{BufMut, Bytes};

use crate::errors::{ProtocolError, Result};

/// Command tags recognized by the protocol.
///
/// The tag byte travels as-is on the wire. Decoding keeps the raw byte so
/// unrecognized tags survive to the dispatcher, which answers them with
/// [`Command::Unknown`] rather than dropping the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Client joins a numbered room: `"<clientName> <roomId>"`.
    JoinRoom = 0x01,
    /// Client chat message: `"<clientName> <text...>"`.
    MessageText = 0x02,
    /// Client offers a previously uploaded file to its room:
    /// `"fo <senderName> <filename> <sizeBytes>"`.
    FileOffer = 0x03,
    /// Opens a file transfer: `"<clientName> <filename> <sizeBytes>"`
    /// client-to-server, `"<filename> <sizeBytes>"` server-to-client.
    FileSize = 0x04,
    /// Raw block of file bytes belonging to the open transfer on this
    /// connection.
    FileChunk = 0x05,
    /// Server status reply to a join.
    JoinRoomResponse = 0x10,
    /// Broadcast text delivered to room members.
    MessageTextResponse = 0x20,
    /// Recipient's answer to a file offer: `"y"` or `"n"`.
    FileOfferResponse = 0x30,
    /// Server error reply for unrecognized or malformed commands.
    Unknown = 0xFF,
}

impl Command {
    /// Parse a raw tag byte. `None` for tags outside the recognized set.
    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0x01 => Some(Self::JoinRoom),
            0x02 => Some(Self::MessageText),
            0x03 => Some(Self::FileOffer),
            0x04 => Some(Self::FileSize),
            0x05 => Some(Self::FileChunk),
            0x10 => Some(Self::JoinRoomResponse),
            0x20 => Some(Self::MessageTextResponse),
            0x30 => Some(Self::FileOfferResponse),
            0xFF => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The wire byte for this tag.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Complete protocol frame.
///
/// Layout on the wire:
/// `[payload length: 4 bytes BE] [command: 1 byte] [payload: variable]`
///
/// # Invariants
///
/// - `payload.len()` never exceeds [`Frame::MAX_PAYLOAD_SIZE`]; violations
///   are rejected at [`Frame::encode`] and by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw command byte, possibly outside the recognized tag set.
    command: u8,

    /// Opaque payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Size of the fixed header: 4-byte length plus 1-byte command.
    pub const HEADER_SIZE: usize = 5;

    /// Maximum payload size (16 MiB).
    pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

    /// Create a frame with a recognized command tag.
    #[must_use]
    pub fn new(command: Command, payload: impl Into<Bytes>) -> Self {
        Self { command: command.to_u8(), payload: payload.into() }
    }

    /// Create a frame carrying a UTF-8 text payload.
    #[must_use]
    pub fn text(command: Command, payload: impl Into<String>) -> Self {
        Self::new(command, payload.into().into_bytes())
    }

    /// Create a frame from a raw tag byte, as read off the wire.
    #[must_use]
    pub fn from_raw(command: u8, payload: Bytes) -> Self {
        Self { command, payload }
    }

    /// The command tag, if the raw byte is in the recognized set.
    #[must_use]
    pub fn command(&self) -> Option<Command> {
        Command::from_u8(self.command)
    }

    /// The raw command byte.
    #[must_use]
    pub fn raw_command(&self) -> u8 {
        self.command
    }

    /// Total encoded size of this frame.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    /// Encode the frame into a buffer.
    ///
    /// The length field is always written in network byte order.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::PayloadTooLarge`] if the payload exceeds
    ///   [`Frame::MAX_PAYLOAD_SIZE`].
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        if self.payload.len() > Self::MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload.len(),
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        dst.put_u32(self.payload.len() as u32);
        dst.put_u8(self.command);
        dst.put_slice(&self.payload);

        Ok(())
    }

    /// Encode the frame into a fresh byte vector.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf)
    }
}
