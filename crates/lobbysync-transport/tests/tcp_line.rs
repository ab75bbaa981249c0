//! Integration tests for the TCP line connection.
//!
//! Each test binds a real listener on an OS-assigned port and plays
//! the server side with raw tokio I/O.

use std::time::Duration;

use lobbysync_transport::{LineConnection, TcpLineConnection, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

/// Binds a listener and connects a client to it.
async fn connected_pair() -> (TcpLineConnection, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let addr = listener.local_addr().expect("should have addr");

    let accept = tokio::spawn(async move { listener.accept().await.expect("should accept").0 });
    let client = TcpLineConnection::connect(addr).await.expect("should connect");
    let server = accept.await.expect("accept task should complete");

    assert_eq!(client.peer_addr(), addr);
    (client, server)
}

#[tokio::test]
async fn test_recv_line_strips_lf_and_crlf() {
    let (client, mut server) = connected_pair().await;
    server
        .write_all(b"welcome\t1\t4\t1\r\nplayerlist\n")
        .await
        .unwrap();

    assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("welcome\t1\t4\t1"));
    assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("playerlist"));
}

#[tokio::test]
async fn test_recv_line_returns_none_after_close() {
    let (client, server) = connected_pair().await;
    drop(server);
    assert!(client.recv_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recv_line_delivers_unterminated_tail_before_eof() {
    let (client, mut server) = connected_pair().await;
    server.write_all(b"first\nsecond").await.unwrap();
    server.shutdown().await.unwrap();
    drop(server);

    assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("first"));
    assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("second"));
    assert!(client.recv_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recv_line_resumes_after_cancelled_read() {
    let (client, mut server) = connected_pair().await;
    server.write_all(b"play").await.unwrap();

    // The partial line arrives, then the read is cancelled.
    let cancelled = tokio::time::timeout(Duration::from_millis(50), client.recv_line()).await;
    assert!(cancelled.is_err());

    server.write_all(b"ernew\t1;a\n").await.unwrap();
    assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("playernew\t1;a"));
}

#[tokio::test]
async fn test_send_line_appends_newline() {
    let (client, server) = connected_pair().await;
    client.send_line("ping").await.unwrap();
    client.send_line("login\t1\tbob\tUS").await.unwrap();

    let mut lines = BufReader::new(server).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("ping"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("login\t1\tbob\tUS"));
}

#[tokio::test]
async fn test_close_signals_eof_to_peer() {
    let (client, server) = connected_pair().await;
    client.close().await.unwrap();

    let mut lines = BufReader::new(server).lines();
    assert!(lines.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_connection_ids_are_unique() {
    let (a, _sa) = connected_pair().await;
    let (b, _sb) = connected_pair().await;
    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    // Bind then drop to get a port with nobody listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = TcpLineConnection::connect(addr).await;
    assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
}
