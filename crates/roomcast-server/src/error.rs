//! Server error types.

use roomcast_proto::ProtocolError;

/// Errors that can occur in the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address, unusable files root).
    ///
    /// Fatal at startup; fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error (bind failure, accept failure, peer gone).
    ///
    /// Fatal for the affected connection only; the server keeps serving
    /// other clients.
    #[error("transport error: {0}")]
    Transport(String),

    /// Framing or payload error from the protocol layer.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A client-supplied name would escape the storage root.
    #[error("unsafe {field} {value:?}")]
    InvalidName {
        /// Which payload token was rejected.
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// Filesystem failure while receiving or relaying a file.
    ///
    /// Aborts the affected transfer; partial files stay in place and the
    /// connection continues.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
