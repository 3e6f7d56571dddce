//! Async connection reader.
//!
//! Drives the [`FrameDecoder`] over any [`AsyncRead`], producing a lazy
//! sequence of decoded frames until EOF or error. The reader never yields a
//! partial frame and imposes no timeout of its own; request-level timeouts
//! belong to the callers that wait on replies.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    decoder::FrameDecoder,
    errors::{ProtocolError, Result},
    frame::Frame,
};

/// Reads frames from an async byte stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    io: R,
    buf: BytesMut,
    decoder: FrameDecoder,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wrap a byte stream.
    pub fn new(io: R) -> Self {
        Self { io, buf: BytesMut::with_capacity(8 * 1024), decoder: FrameDecoder::new() }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` when the stream closes cleanly on a frame
    /// boundary.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Truncated`] if the stream ends mid-frame.
    /// - [`ProtocolError::PayloadTooLarge`] for a malformed length field.
    /// - [`ProtocolError::Io`] on transport failure.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.decoder.decode(&mut self.buf)? {
                return Ok(Some(frame));
            }

            let n = self.io.read_buf(&mut self.buf).await?;
            if n == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::Truncated { pending: self.buf.len() });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::frame::Command;

    #[tokio::test]
    async fn reads_frame_sequence() {
        let frames = vec![
            Frame::new(Command::JoinRoom, Bytes::from_static(b"alice 7")),
            Frame::new(Command::MessageText, Bytes::from_static(b"alice hello")),
        ];

        let mut wire = Vec::new();
        for frame in &frames {
            frame.encode(&mut wire).unwrap();
        }

        let mut reader = FrameReader::new(&wire[..]);
        assert_eq!(reader.next_frame().await.unwrap(), Some(frames[0].clone()));
        assert_eq!(reader.next_frame().await.unwrap(), Some(frames[1].clone()));
        assert_eq!(reader.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clean_eof_on_boundary() {
        let wire: &[u8] = &[];
        let mut reader = FrameReader::new(wire);
        assert_eq!(reader.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_final_frame_is_truncated() {
        let frame = Frame::new(Command::MessageText, Bytes::from_static(b"bob hi"));
        let wire = frame.to_vec().unwrap();

        let mut reader = FrameReader::new(&wire[..wire.len() - 2]);
        let err = reader.next_frame().await.unwrap_err();
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }
}
