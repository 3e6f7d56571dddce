//! Roomcast server.
//!
//! A TCP chat and file-relay server: clients hold one persistent framed
//! connection each, join numbered rooms, broadcast text to room peers, and
//! offer files that the server relays to each accepting peer. Uploaded
//! files are persisted under `<files root>/<clientName>/<filename>`.
//!
//! # Architecture
//!
//! One task per accepted connection drives a [`roomcast_proto::FrameReader`]
//! into the per-connection dispatcher; one writer task per connection
//! drains its outbound queue so frames from any number of tasks stay
//! atomic on the socket. Shared state is a handful of self-synchronized
//! registries:
//!
//! - [`RoomRegistry`]: client ↔ room membership plus the per-room
//!   broadcast log
//! - [`ResponseTable`]: single-shot slots correlating offer replies back
//!   to waiting offer workers
//! - `PeerMap` (internal): per-connection outbound queues
//! - [`CommandStats`]: per-command dispatch counters
//!
//! File reception state is owned by the connection task itself and needs
//! no locking.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod files;
mod offer;
mod peers;
mod registry;
mod responses;
mod session;
mod stats;
mod transport;

use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

pub use error::ServerError;
pub use registry::{ClientId, LOBBY_ROOM, RoomId, RoomRegistry};
pub use responses::{OfferOutcome, ResponseTable};
use roomcast_proto::{Command, FrameReader};
pub use stats::CommandStats;
use tokio::net::TcpStream;
pub use transport::TcpTransport;

use crate::{peers::PeerMap, session::Session};

/// Tunable server parameters shared by every connection.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory uploaded files are stored under.
    pub files_root: PathBuf,
    /// How long an offer worker waits for a recipient's reply.
    pub offer_timeout: Duration,
    /// Block size for relay streaming.
    pub chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            files_root: PathBuf::from("ServerFiles"),
            offer_timeout: Duration::from_millis(30_000),
            chunk_size: 1024,
        }
    }
}

/// Runtime configuration: where to listen and the shared parameters.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g. `"0.0.0.0:12345"`).
    pub bind_address: String,
    /// Shared server parameters.
    pub server: ServerConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:12345".to_string(), server: ServerConfig::default() }
    }
}

/// Shared registries every connection task works against.
pub(crate) struct ServerState {
    pub(crate) rooms: RoomRegistry,
    pub(crate) responses: ResponseTable,
    pub(crate) peers: PeerMap,
    pub(crate) stats: CommandStats,
    pub(crate) config: ServerConfig,
}

/// Cloneable view over the server's shared state.
///
/// For in-process observation and tests: the wire protocol carries no
/// introspection commands, so embedding code reads the registries
/// directly through this handle.
#[derive(Clone)]
pub struct ServerHandle {
    state: Arc<ServerState>,
}

impl ServerHandle {
    /// Snapshot of a room's broadcast log.
    #[must_use]
    pub fn room_log(&self, room: RoomId) -> Vec<String> {
        self.state.rooms.room_log(room)
    }

    /// Snapshot of a room's members.
    #[must_use]
    pub fn room_members(&self, room: RoomId) -> Vec<ClientId> {
        self.state.rooms.members(room)
    }

    /// Number of connected (registered) clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.state.rooms.client_count()
    }

    /// Number of currently armed offer-reply slots.
    #[must_use]
    pub fn armed_response_count(&self) -> usize {
        self.state.responses.armed_count()
    }

    /// Dispatches seen for one command tag.
    #[must_use]
    pub fn command_count(&self, command: Command) -> u64 {
        self.state.stats.count(command.to_u8())
    }
}

/// The Roomcast server: a bound listener plus the shared registries.
pub struct Server {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl Server {
    /// Bind the listening socket and prepare the files root.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let transport = TcpTransport::bind(&config.bind_address).await?;

        tokio::fs::create_dir_all(&config.server.files_root).await.map_err(|e| {
            ServerError::Config(format!(
                "failed to create files root '{}': {e}",
                config.server.files_root.display()
            ))
        })?;

        let state = Arc::new(ServerState {
            rooms: RoomRegistry::new(),
            responses: ResponseTable::new(),
            peers: PeerMap::new(),
            stats: CommandStats::new(),
            config: config.server,
        });

        Ok(Self { transport, state })
    }

    /// Handle for in-process observation. Stays valid after [`Server::run`]
    /// consumes the server.
    #[must_use]
    pub fn handle(&self) -> ServerHandle {
        ServerHandle { state: Arc::clone(&self.state) }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }

    /// Accept connections forever, one handler task per connection.
    ///
    /// Never returns during normal operation; accept failures are logged
    /// and the loop continues.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server listening on {}", self.transport.local_addr()?);

        let next_id = AtomicU64::new(1);

        loop {
            match self.transport.accept().await {
                Ok((socket, addr)) => {
                    let id = next_id.fetch_add(1, Ordering::Relaxed);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        handle_connection(id, socket, addr, state).await;
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }
}

/// Drive one connection from accept to teardown.
///
/// Registers the client (lobby room, outbound queue), then feeds decoded
/// frames to the dispatcher until EOF or a framing error. Teardown order
/// matters: leave the room first so no new broadcasts target the client,
/// then drop any upload in flight, unblock offer workers waiting on this
/// client, and finally drop the outbound queue so the writer drains and
/// exits.
async fn handle_connection(
    id: ClientId,
    socket: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) {
    tracing::debug!(client = id, %addr, "connection accepted");

    let (read_half, write_half) = socket.into_split();
    let outbound = state.peers.register(id);
    state.rooms.register(id);

    let writer = tokio::spawn(peers::write_outbound(write_half, outbound));

    let mut reader = FrameReader::new(read_half);
    let mut session = Session::new(id, Arc::clone(&state));

    loop {
        match reader.next_frame().await {
            Ok(Some(frame)) => session.handle_frame(frame).await,
            Ok(None) => {
                tracing::debug!(client = id, "connection closed");
                break;
            },
            Err(e) => {
                tracing::warn!(client = id, error = %e, "closing connection");
                break;
            },
        }
    }

    state.rooms.leave(id);
    session.abort_upload();
    state.responses.fulfil(id, OfferOutcome::Disconnected);
    state.peers.unregister(id);

    let _ = writer.await;
    tracing::debug!(client = id, "connection torn down");
}
