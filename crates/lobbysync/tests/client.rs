//! Integration tests for the `Client` run loop over a scripted
//! in-memory connection.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lobbysync::prelude::*;
use lobbysync_transport::ConnectionId;
use tokio::sync::mpsc;

// =========================================================================
// Mock connection
// =========================================================================

/// A connection whose inbound lines come from a channel and whose
/// outbound lines are recorded.
struct ScriptedConnection {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<String, ()>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

/// The test side of a `ScriptedConnection`.
struct Server {
    tx: mpsc::UnboundedSender<Result<String, ()>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl Server {
    fn push(&self, line: &str) {
        self.tx.send(Ok(line.to_string())).unwrap();
    }

    fn fail(&self) {
        self.tx.send(Err(())).unwrap();
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

fn scripted() -> (ScriptedConnection, Server) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let conn = ScriptedConnection {
        inbound: tokio::sync::Mutex::new(rx),
        sent: Arc::clone(&sent),
    };
    (conn, Server { tx, sent })
}

impl LineConnection for ScriptedConnection {
    async fn send_line(&self, line: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(line.to_string());
        Ok(())
    }

    async fn recv_line(&self) -> Result<Option<String>, TransportError> {
        match self.inbound.lock().await.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(())) => Err(TransportError::ConnectionClosed("reset by test".into())),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        ConnectionId::new(1)
    }
}

fn config() -> ClientConfig {
    ClientConfig::default().with_name("Alice").with_team("Red").with_locale("JP")
}

// =========================================================================
// Run loop
// =========================================================================

#[tokio::test]
async fn test_run_logs_in_and_applies_deltas_until_close() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config());
    let session = client.session();

    server.push("welcome\t1\t4\t1");
    server.push("loginsuccess\tAlice\t7");
    server.push("playernew\t7;Alice;JP;host;-1;-1;-1");
    server.push("changestatus\tjoinseat\t0\t7\t0\t3");
    let sent = Arc::clone(&server.sent);
    drop(server);

    client.run().await.unwrap();

    assert_eq!(sent.lock().unwrap().as_slice(), ["login\t1\tAlice\tJP\tRed"]);
    let me = session.my_info().unwrap();
    assert_eq!(me.uid, 7);
    assert_eq!(me.seat_id, 3);
    assert_eq!(me.queue_id, NO_QUEUE);
    assert_eq!(client.dispatcher().state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_run_skips_malformed_lines() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config());
    let session = client.session();

    server.push("playernew\t1;a;;;-1;-1;-1");
    server.push("playerupdate");
    server.push("playernew\tx;b;;;-1;-1;-1");
    server.push("playernew\t2;b;;;-1;-1;-1");
    drop(server);

    client.run().await.unwrap();

    let uids: Vec<i32> = session.players().iter().map(|p| p.uid).collect();
    assert_eq!(uids, [1, 2]);
}

#[tokio::test]
async fn test_run_returns_transport_error_and_keeps_session() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config());
    let session = client.session();

    server.push("loginsuccess\tAlice\t7");
    server.fail();

    let err = client.run().await.unwrap_err();
    assert!(matches!(err, LobbySyncError::Transport(_)));
    assert_eq!(session.my_uid(), 7);
    assert_eq!(client.dispatcher().state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_listener_added_to_client_is_notified() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config());
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&kinds);
    client.add_listener(move |msg: &ServerMessage, _: &str, _: &SessionState| {
        sink.lock().unwrap().push(msg.kind().to_string());
    });

    server.push("roomcreate\t1;Room;4;0;0");
    server.push("lobbychat\thi");
    drop(server);

    client.run().await.unwrap();
    assert_eq!(kinds.lock().unwrap().as_slice(), ["roomcreate", "lobbychat"]);
}

// =========================================================================
// Keepalive
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_run_pings_at_default_interval() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config().with_ping_interval(Duration::from_secs(2)));

    let handle = tokio::spawn(async move {
        client.run().await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(4_500)).await;
    let pings = server.sent().iter().filter(|l| *l == "ping").count();
    assert_eq!(pings, 2);

    drop(server);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_run_adopts_server_keepalive_interval() {
    let (conn, server) = scripted();
    let mut client = Client::new(conn, config());

    server.push("welcome\t1\t0\t0\t2\tv2\t1000");
    let handle = tokio::spawn(async move {
        client.run().await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let sent = server.sent();
    assert!(sent[0].starts_with("login\t"));
    assert_eq!(sent.iter().filter(|l| *l == "ping").count(), 3);

    drop(server);
    handle.await.unwrap();
}
