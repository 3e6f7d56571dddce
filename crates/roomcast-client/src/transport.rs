//! TCP transport for the client.
//!
//! Provides [`ConnectedClient`], which handles socket I/O for frame
//! transport. Frames are sent and received via channels; an internal task
//! owns the socket and dies with the connection.

use roomcast_proto::{Frame, FrameReader};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, tcp::OwnedWriteHalf},
    sync::mpsc,
};

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connection task is gone; the socket is closed.
    #[error("connection closed")]
    Closed,
}

/// Handle to a connected client.
///
/// Frames are sent and received via the channels; dropping the handle (or
/// calling [`ConnectedClient::stop`]) tears the connection down.
#[derive(Debug)]
pub struct ConnectedClient {
    /// Send frames to the server.
    pub to_server: mpsc::Sender<Frame>,
    /// Receive frames from the server.
    pub from_server: mpsc::Receiver<Frame>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Queue a frame for the server.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        self.to_server.send(frame).await.map_err(|_| TransportError::Closed)
    }

    /// Receive the next frame from the server. `None` once the connection
    /// is closed and all buffered frames are consumed.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.from_server.recv().await
    }

    /// Stop the connection.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Roomcast server.
pub async fn connect(server_addr: &str) -> Result<ConnectedClient, TransportError> {
    let stream = TcpStream::connect(server_addr)
        .await
        .map_err(|e| TransportError::Connection(format!("connect to {server_addr} failed: {e}")))?;

    let (to_server_tx, to_server_rx) = mpsc::channel::<Frame>(32);
    let (from_server_tx, from_server_rx) = mpsc::channel::<Frame>(1024);

    let handle = tokio::spawn(run_connection(stream, to_server_rx, from_server_tx));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between the channels and the socket.
///
/// Ends when the caller drops its sending channel (after flushing queued
/// frames) or when the socket errors out.
async fn run_connection(
    stream: TcpStream,
    mut to_server: mpsc::Receiver<Frame>,
    from_server: mpsc::Sender<Frame>,
) {
    let (read_half, write_half) = stream.into_split();

    let recv_handle = tokio::spawn(async move {
        let mut reader = FrameReader::new(read_half);
        loop {
            match reader.next_frame().await {
                Ok(Some(frame)) => {
                    if from_server.send(frame).await.is_err() {
                        break;
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("read error: {e}");
                    break;
                },
            }
        }
    });

    send_loop(write_half, &mut to_server).await;

    recv_handle.abort();
}

/// Drain the outbound channel onto the socket.
async fn send_loop(mut io: OwnedWriteHalf, to_server: &mut mpsc::Receiver<Frame>) {
    while let Some(frame) = to_server.recv().await {
        let wire = match frame.to_vec() {
            Ok(wire) => wire,
            Err(e) => {
                tracing::warn!("dropping unencodable frame: {e}");
                continue;
            },
        };

        if let Err(e) = io.write_all(&wire).await {
            tracing::debug!("write error: {e}");
            return;
        }
    }

    let _ = io.flush().await;
}
