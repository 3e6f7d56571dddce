//! Text payload forms carried by command frames.
//!
//! Payloads are UTF-8 text with whitespace-separated leading tokens; only
//! the chat text field may itself contain whitespace (it is the verbatim
//! remainder after the sender token). Each form has a `parse`/`encode`
//! pair; `parse` accepts the raw payload bytes as they come off a frame.

use crate::errors::{ProtocolError, Result};

fn text(payload: &[u8]) -> Result<&str> {
    Ok(std::str::from_utf8(payload)?)
}

fn parse_u64(field: &'static str, token: &str) -> Result<u64> {
    token
        .parse()
        .map_err(|_| ProtocolError::InvalidToken { field, value: token.to_string() })
}

fn parse_i64(field: &'static str, token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| ProtocolError::InvalidToken { field, value: token.to_string() })
}

/// Join request: `"<clientName> <roomId>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRoom {
    /// Display name the client signs its traffic with.
    pub client_name: String,
    /// Target room. Negative ids are legal; room 0 is the implicit
    /// pre-join room.
    pub room_id: i64,
}

impl JoinRoom {
    /// Parse from raw payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut tokens = text(payload)?.split_whitespace();
        let client_name =
            tokens.next().ok_or(ProtocolError::MissingToken("clientName"))?.to_string();
        let room_token = tokens.next().ok_or(ProtocolError::MissingToken("roomId"))?;

        Ok(Self { client_name, room_id: parse_i64("roomId", room_token)? })
    }

    /// Wire form of this payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{} {}", self.client_name, self.room_id)
    }
}

/// Chat message: `"<clientName> <text...>"`.
///
/// The text is everything after the sender token with one leading
/// separator consumed, preserved verbatim (interior whitespace included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender's display name.
    pub client_name: String,
    /// Message body, possibly empty.
    pub text: String,
}

impl ChatMessage {
    /// Parse from raw payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let raw = text(payload)?;
        if raw.is_empty() {
            return Err(ProtocolError::MissingToken("clientName"));
        }

        let (client_name, body) = raw.split_once(' ').unwrap_or((raw, ""));
        Ok(Self { client_name: client_name.to_string(), text: body.to_string() })
    }

    /// Wire form of this payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{} {}", self.client_name, self.text)
    }
}

/// File offer: `"fo <senderName> <filename> <sizeBytes>"`.
///
/// The literal `fo` prefix is part of the wire form in both directions:
/// clients announce offers with it and the server forwards the same form
/// to each prospective recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOffer {
    /// Name the offering client uploaded under.
    pub sender_name: String,
    /// Bare filename of the offered file.
    pub filename: String,
    /// Advertised size in bytes.
    pub size: u64,
}

impl FileOffer {
    /// Literal prefix token.
    pub const PREFIX: &'static str = "fo";

    /// Parse from raw payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut tokens = text(payload)?.split_whitespace();

        let prefix = tokens.next().ok_or(ProtocolError::MissingToken("fo prefix"))?;
        if prefix != Self::PREFIX {
            return Err(ProtocolError::BadPrefix {
                expected: Self::PREFIX,
                found: prefix.to_string(),
            });
        }

        let sender_name =
            tokens.next().ok_or(ProtocolError::MissingToken("senderName"))?.to_string();
        let filename = tokens.next().ok_or(ProtocolError::MissingToken("filename"))?.to_string();
        let size_token = tokens.next().ok_or(ProtocolError::MissingToken("sizeBytes"))?;

        Ok(Self { sender_name, filename, size: parse_u64("sizeBytes", size_token)? })
    }

    /// Wire form of this payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{} {} {} {}", Self::PREFIX, self.sender_name, self.filename, self.size)
    }
}

/// Client-to-server transfer opener: `"<clientName> <filename> <sizeBytes>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHeader {
    /// Uploading client's name; selects the storage subdirectory.
    pub client_name: String,
    /// Bare filename to store under.
    pub filename: String,
    /// Total upload size in bytes.
    pub size: u64,
}

impl UploadHeader {
    /// Parse from raw payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut tokens = text(payload)?.split_whitespace();
        let client_name =
            tokens.next().ok_or(ProtocolError::MissingToken("clientName"))?.to_string();
        let filename = tokens.next().ok_or(ProtocolError::MissingToken("filename"))?.to_string();
        let size_token = tokens.next().ok_or(ProtocolError::MissingToken("sizeBytes"))?;

        Ok(Self { client_name, filename, size: parse_u64("sizeBytes", size_token)? })
    }

    /// Wire form of this payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{} {} {}", self.client_name, self.filename, self.size)
    }
}

/// Server-to-client transfer opener: `"<filename> <sizeBytes>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadHeader {
    /// Bare filename of the incoming file.
    pub filename: String,
    /// Total download size in bytes.
    pub size: u64,
}

impl DownloadHeader {
    /// Parse from raw payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut tokens = text(payload)?.split_whitespace();
        let filename = tokens.next().ok_or(ProtocolError::MissingToken("filename"))?.to_string();
        let size_token = tokens.next().ok_or(ProtocolError::MissingToken("sizeBytes"))?;

        Ok(Self { filename, size: parse_u64("sizeBytes", size_token)? })
    }

    /// Wire form of this payload.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{} {}", self.filename, self.size)
    }
}

/// A recipient's answer to a file offer.
///
/// The wire forms are `"y"` and `"n"`; anything that is not exactly `"y"`
/// counts as a decline, so parsing cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferReply {
    /// Recipient wants the file.
    Accept,
    /// Recipient declined (or sent anything other than `"y"`).
    Decline,
}

impl OfferReply {
    /// Interpret raw payload bytes.
    #[must_use]
    pub fn parse(payload: &[u8]) -> Self {
        if payload == b"y" { Self::Accept } else { Self::Decline }
    }

    /// Wire form of this reply.
    #[must_use]
    pub fn encode(self) -> &'static str {
        match self {
            Self::Accept => "y",
            Self::Decline => "n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_room_round_trip() {
        let join = JoinRoom { client_name: "alice".to_string(), room_id: 7 };
        let parsed = JoinRoom::parse(join.encode().as_bytes()).unwrap();
        assert_eq!(parsed, join);
    }

    #[test]
    fn join_room_negative_id() {
        let parsed = JoinRoom::parse(b"bob -3").unwrap();
        assert_eq!(parsed.room_id, -3);
    }

    #[test]
    fn join_room_rejects_bad_id() {
        let err = JoinRoom::parse(b"bob seven").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidToken { field: "roomId", .. }));
    }

    #[test]
    fn chat_keeps_remainder_verbatim() {
        let parsed = ChatMessage::parse(b"alice hello  spaced   world").unwrap();
        assert_eq!(parsed.client_name, "alice");
        assert_eq!(parsed.text, "hello  spaced   world");
    }

    #[test]
    fn chat_with_no_text() {
        let parsed = ChatMessage::parse(b"alice").unwrap();
        assert_eq!(parsed.text, "");
    }

    #[test]
    fn chat_rejects_empty_payload() {
        assert!(matches!(ChatMessage::parse(b"").unwrap_err(), ProtocolError::MissingToken(_)));
    }

    #[test]
    fn file_offer_requires_prefix() {
        let err = FileOffer::parse(b"offer alice doc.bin 2048").unwrap_err();
        assert!(matches!(err, ProtocolError::BadPrefix { .. }));
    }

    #[test]
    fn file_offer_round_trip() {
        let offer = FileOffer {
            sender_name: "alice".to_string(),
            filename: "doc.bin".to_string(),
            size: 2048,
        };
        let parsed = FileOffer::parse(offer.encode().as_bytes()).unwrap();
        assert_eq!(parsed, offer);
    }

    #[test]
    fn upload_header_round_trip() {
        let header = UploadHeader {
            client_name: "carol".to_string(),
            filename: "notes.txt".to_string(),
            size: 11,
        };
        let parsed = UploadHeader::parse(header.encode().as_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn download_header_round_trip() {
        let header = DownloadHeader { filename: "doc.bin".to_string(), size: 2048 };
        let parsed = DownloadHeader::parse(header.encode().as_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn offer_reply_only_y_accepts() {
        assert_eq!(OfferReply::parse(b"y"), OfferReply::Accept);
        assert_eq!(OfferReply::parse(b"n"), OfferReply::Decline);
        assert_eq!(OfferReply::parse(b"yes"), OfferReply::Decline);
        assert_eq!(OfferReply::parse(b""), OfferReply::Decline);
    }

    #[test]
    fn payload_must_be_utf8() {
        let err = JoinRoom::parse(&[0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, ProtocolError::NotText(_)));
    }
}
