//! Roomcast wire protocol.
//!
//! Every message on a Roomcast connection is a single frame:
//!
//! ```text
//!  offset  size  field
//!    0      4    payload length (unsigned, big endian)
//!    4      1    command tag
//!    5      L    payload (opaque bytes)
//! ```
//!
//! The crate provides the frame type and command tags ([`Frame`],
//! [`Command`]), an incremental decoder that reassembles frames from an
//! arbitrarily-split byte stream ([`FrameDecoder`]), an async connection
//! reader that drives the decoder over any [`tokio::io::AsyncRead`]
//! ([`FrameReader`]), and the whitespace-token text payloads carried by the
//! command frames ([`payloads`]).
//!
//! Frames are self-delimiting; writers must emit each encoded frame
//! atomically, but no alignment or padding exists between frames.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod errors;
mod frame;
pub mod payloads;
mod reader;

pub use decoder::FrameDecoder;
pub use errors::{ProtocolError, Result};
pub use frame::{Command, Frame};
pub use reader::FrameReader;
