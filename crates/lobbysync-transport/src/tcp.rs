//! Line-framed TCP connection on tokio.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

use crate::{ConnectionId, LineConnection, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Read half plus whatever part of the current line has arrived so far.
///
/// `pending` lives here rather than inside `recv_line` so a cancelled
/// read resumes where it stopped.
struct LineReader {
    inner: BufReader<OwnedReadHalf>,
    pending: Vec<u8>,
}

/// A TCP connection carrying `\n`-terminated UTF-8 lines.
///
/// Reads and writes lock separate halves, so one task can wait on
/// `recv_line` while another sends.
pub struct TcpLineConnection {
    id: ConnectionId,
    peer: SocketAddr,
    reader: Mutex<LineReader>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpLineConnection {
    /// Connects to a lobby server.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        Self::from_stream(stream)
    }

    /// Wraps an already-connected stream.
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        let peer = stream.peer_addr().map_err(TransportError::ConnectFailed)?;
        // Lines are small and latency matters more than throughput.
        stream.set_nodelay(true).map_err(TransportError::ConnectFailed)?;

        let (read_half, write_half) = stream.into_split();
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "TCP line connection opened");

        Ok(Self {
            id,
            peer,
            reader: Mutex::new(LineReader {
                inner: BufReader::new(read_half),
                pending: Vec::new(),
            }),
            writer: Mutex::new(write_half),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl LineConnection for TcpLineConnection {
    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        let mut frame = Vec::with_capacity(line.len() + 1);
        frame.extend_from_slice(line.as_bytes());
        frame.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv_line(&self) -> Result<Option<String>, TransportError> {
        let mut reader = self.reader.lock().await;
        let LineReader { inner, pending } = &mut *reader;

        let read = inner
            .read_until(b'\n', pending)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if read == 0 && pending.is_empty() {
            tracing::debug!(id = %self.id, "peer closed connection");
            return Ok(None);
        }

        // Either a full line or the unterminated tail before EOF.
        let mut bytes = std::mem::take(pending);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
