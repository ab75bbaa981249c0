//! The client run loop: one connection, one dispatcher, one keepalive.
//!
//! ```text
//!            ┌──────────── recv_line ────────────┐
//! socket ────┤                                   ├──→ dispatcher ──→ commands
//!            └── send_line ←── outbound queue ←──┘         │
//!                                   ↑                      │
//!                               PingTask ←── SetKeepalive ─┘
//! ```
//!
//! Everything runs on the task that calls [`Client::run`]. The only
//! other task is the [`PingTask`], and it only feeds the outbound queue.

use lobbysync_session::SharedSession;
use lobbysync_transport::{LineConnection, PingTask, TcpLineConnection, TransportError};
use tokio::net::ToSocketAddrs;
use tokio::sync::mpsc;

use crate::{ClientConfig, Command, LobbySyncError, MessageListener, ProtocolDispatcher};

/// Room for queued keepalives while a send is in flight.
const OUTBOUND_CAPACITY: usize = 16;

/// A lobby client over any [`LineConnection`].
pub struct Client<C: LineConnection> {
    conn: C,
    dispatcher: ProtocolDispatcher,
}

impl Client<TcpLineConnection> {
    /// Connects over TCP. Call [`run`](Self::run) to start the session.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        config: ClientConfig,
    ) -> Result<Self, LobbySyncError> {
        let conn = TcpLineConnection::connect(addr).await?;
        tracing::info!(peer = %conn.peer_addr(), "connected to lobby server");
        Ok(Self::new(conn, config))
    }
}

impl<C: LineConnection> Client<C> {
    pub fn new(conn: C, config: ClientConfig) -> Self {
        Self {
            conn,
            dispatcher: ProtocolDispatcher::new(config),
        }
    }

    /// A handle to the session this client keeps up to date.
    pub fn session(&self) -> SharedSession {
        self.dispatcher.session().clone()
    }

    pub fn dispatcher(&self) -> &ProtocolDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut ProtocolDispatcher {
        &mut self.dispatcher
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn add_listener(&mut self, listener: impl MessageListener + 'static) {
        self.dispatcher.add_listener(listener);
    }

    /// Runs the session until the server closes the connection.
    ///
    /// Malformed lines are logged and skipped. Returns `Ok(())` on a
    /// clean close and the transport error otherwise. Either way the
    /// dispatcher ends up `Disconnected` with the session left intact.
    pub async fn run(&mut self) -> Result<(), LobbySyncError> {
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
        let ping_message = self.dispatcher.config().ping_message.clone();

        self.dispatcher.on_connected();
        let mut keepalive = PingTask::spawn(
            outbound_tx.clone(),
            ping_message.clone(),
            self.dispatcher.config().ping_interval(),
        );

        let result = loop {
            tokio::select! {
                inbound = self.conn.recv_line() => {
                    let line = match inbound {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            tracing::info!(id = %self.conn.id(), "server closed connection");
                            break Ok(());
                        }
                        Err(e) => break Err(e),
                    };

                    // A malformed line is logged by the dispatcher; skip it.
                    let Ok(commands) = self.dispatcher.handle_line(&line) else {
                        continue;
                    };

                    let executed =
                        execute(&self.conn, commands, &outbound_tx, &ping_message, &mut keepalive)
                            .await;
                    if let Err(e) = executed {
                        break Err(e);
                    }
                }
                Some(line) = outbound_rx.recv() => {
                    if let Err(e) = self.conn.send_line(&line).await {
                        break Err(e);
                    }
                }
            }
        };

        drop(keepalive);
        self.dispatcher.on_disconnected();
        result.map_err(LobbySyncError::from)
    }
}

/// Carries out the dispatcher's commands for one line, in order.
async fn execute<C: LineConnection>(
    conn: &C,
    commands: Vec<Command>,
    outbound: &mpsc::Sender<String>,
    ping_message: &str,
    keepalive: &mut PingTask,
) -> Result<(), TransportError> {
    for command in commands {
        match command {
            Command::Send(message) => conn.send_line(&message.to_line()).await?,
            Command::SetKeepalive(interval) => {
                // Replacing the task drops, and so aborts, the old one.
                *keepalive = PingTask::spawn(outbound.clone(), ping_message, interval);
            }
        }
    }
    Ok(())
}
