//! Roomcast client transport.
//!
//! A thin layer over one TCP connection to a Roomcast server: frames go
//! in and out through channels, and an internal task owns the socket.
//! Prompting, console I/O, and any interactive behavior live with the
//! caller; this crate only moves frames.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod transport;

pub use transport::{ConnectedClient, TransportError, connect};
