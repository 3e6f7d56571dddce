//! Incremental frame decoder.
//!
//! Reassembles frames from a byte stream delivered in arbitrary pieces. The
//! decoder holds no state of its own; all partial input stays in the
//! caller's buffer, so feeding the stream one byte at a time yields the
//! same frame sequence as feeding it whole.

use bytes::BytesMut;

use crate::{
    errors::{ProtocolError, Result},
    frame::Frame,
};

/// Streaming decoder over a caller-owned [`BytesMut`].
#[derive(Debug, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Try to decode one complete frame from the front of `src`.
    ///
    /// Returns `Ok(None)` when the buffer holds only a partial header or
    /// payload; the caller should read more bytes and call again. Consumed
    /// bytes are split off `src`, so leftover input carries over to the
    /// next call.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::PayloadTooLarge`] if the header claims more than
    ///   [`Frame::MAX_PAYLOAD_SIZE`] bytes. The stream is desynchronized at
    ///   that point and the connection should be closed.
    pub fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if src.len() < Frame::HEADER_SIZE {
            return Ok(None);
        }

        let payload_len = u32::from_be_bytes([src[0], src[1], src[2], src[3]]);
        if payload_len > Frame::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_len as usize,
                max: Frame::MAX_PAYLOAD_SIZE as usize,
            });
        }

        let total = Frame::HEADER_SIZE + payload_len as usize;
        if src.len() < total {
            // Pre-grow so the pending payload arrives in few reads.
            src.reserve(total - src.len());
            return Ok(None);
        }

        let header = src.split_to(Frame::HEADER_SIZE);
        let payload = src.split_to(payload_len as usize).freeze();

        Ok(Some(Frame::from_raw(header[4], payload)))
    }
}
