//! Protocol error types.

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding, decoding, or parsing protocol data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Payload length exceeds the protocol limit.
    ///
    /// Raised on encode for oversized frames and on decode when a header
    /// claims more than [`crate::Frame::MAX_PAYLOAD_SIZE`] bytes. A decoder
    /// hitting this cannot resynchronize; the connection must be closed.
    #[error("payload of {size} bytes exceeds limit of {max}")]
    PayloadTooLarge {
        /// Claimed or actual payload size.
        size: usize,
        /// Maximum the protocol accepts.
        max: usize,
    },

    /// The byte stream ended in the middle of a frame.
    ///
    /// EOF on a frame boundary is a clean close and is not an error; EOF
    /// with a partial header or payload buffered is.
    #[error("stream closed with {pending} buffered bytes mid-frame")]
    Truncated {
        /// Bytes buffered when the stream ended.
        pending: usize,
    },

    /// A text payload was not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    NotText(#[from] std::str::Utf8Error),

    /// A required token was absent from a text payload.
    #[error("missing {0} token in payload")]
    MissingToken(&'static str),

    /// A token was present but failed to parse.
    #[error("invalid {field} token {value:?}")]
    InvalidToken {
        /// Which token failed.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// A payload did not start with its required literal prefix.
    #[error("expected {expected:?} prefix, found {found:?}")]
    BadPrefix {
        /// The prefix the payload form requires.
        expected: &'static str,
        /// What was actually there.
        found: String,
    },

    /// Underlying transport I/O failure while reading frames.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
