//! Test helpers for controller session integration tests.
//!
//! This module provides a mock paging controller:
//! - A WebSocket server on an ephemeral localhost port
//! - Per-connection handles to push frames and read client requests
//! - Event helpers to wait for specific state changes

use client_core::credentials::CredentialStore;
use client_core::protocol::ClientEnvelope;
use client_core::state::ClientEvent;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// How long helpers wait before declaring an expectation failed.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(3);

enum ServerOp {
    Send(String),
    Close,
}

/// One accepted client connection, driven from the test body.
pub struct MockSession {
    ops: mpsc::UnboundedSender<ServerOp>,
    envelopes: mpsc::UnboundedReceiver<ClientEnvelope>,
}

impl MockSession {
    /// Push one frame to the connected client.
    pub fn push(&self, frame: serde_json::Value) {
        self.ops
            .send(ServerOp::Send(frame.to_string()))
            .expect("mock connection task gone");
    }

    /// Push raw text to the connected client.
    pub fn push_text(&self, text: &str) {
        self.ops
            .send(ServerOp::Send(text.to_owned()))
            .expect("mock connection task gone");
    }

    /// Close the connection from the server side.
    pub fn close(&self) {
        let _ = self.ops.send(ServerOp::Close);
    }

    /// Wait for the next request from the client.
    pub async fn recv_envelope(&mut self) -> ClientEnvelope {
        timeout(WAIT_TIMEOUT, self.envelopes.recv())
            .await
            .expect("timed out waiting for a client request")
            .expect("mock connection closed")
    }

    /// Assert the client sends nothing for the given duration.
    pub async fn expect_no_envelope(&mut self, quiet_for: Duration) {
        if let Ok(received) = timeout(quiet_for, self.envelopes.recv()).await {
            panic!("expected no client request, got {received:?}");
        }
    }
}

/// A mock controller accepting any number of client connections.
pub struct MockController {
    pub url: String,
    accepted: mpsc::UnboundedReceiver<MockSession>,
}

impl MockController {
    /// Bind an ephemeral port and start accepting connections.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock controller");
        let port = listener
            .local_addr()
            .expect("mock controller has no local address")
            .port();
        let url = format!("ws://127.0.0.1:{port}");

        let (accepted_tx, accepted) = mpsc::unbounded_channel();
        TokioSpawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (ops_tx, ops_rx) = mpsc::unbounded_channel();
                let (envelope_tx, envelope_rx) = mpsc::unbounded_channel();
                if accepted_tx
                    .send(MockSession {
                        ops: ops_tx,
                        envelopes: envelope_rx,
                    })
                    .is_err()
                {
                    break;
                }
                TokioSpawn(serve_connection(stream, ops_rx, envelope_tx));
            }
        });

        Self { url, accepted }
    }

    /// Wait for the next client connection.
    pub async fn next_session(&mut self) -> MockSession {
        timeout(WAIT_TIMEOUT, self.accepted.recv())
            .await
            .expect("timed out waiting for a client connection")
            .expect("mock controller listener gone")
    }

    /// Assert no client connects within the given duration.
    pub async fn expect_no_session(&mut self, quiet_for: Duration) {
        if timeout(quiet_for, self.accepted.recv()).await.is_ok() {
            panic!("expected no client connection");
        }
    }
}

/// Serve one accepted connection: forward pushed frames to the client and
/// parsed client requests back to the test.
async fn serve_connection(
    stream: TcpStream,
    mut ops: mpsc::UnboundedReceiver<ServerOp>,
    envelopes: mpsc::UnboundedSender<ClientEnvelope>,
) {
    let ws_stream = accept_async(stream)
        .await
        .expect("mock controller handshake failed");
    let (mut sink, mut reader) = ws_stream.split();

    loop {
        tokio::select! {
            op = ops.recv() => match op {
                Some(ServerOp::Send(text)) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(ServerOp::Close) => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                None => break,
            },
            message = reader.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let envelope = serde_json::from_str::<ClientEnvelope>(text.as_str())
                        .expect("client sent an unparseable request");
                    if envelopes.send(envelope).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }
}

/// Test helper: a credential store in a throwaway directory.
pub fn temp_store() -> (TempDir, CredentialStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = CredentialStore::new(dir.path());
    (dir, store)
}

/// Test helper: a localhost port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind probe listener");
    let port = listener
        .local_addr()
        .expect("probe listener has no local address")
        .port();
    drop(listener);
    port
}

/// Test helper: wait for the first event matching the predicate.
pub async fn wait_for_event(
    rx: &mut broadcast::Receiver<ClientEvent>,
    matches: impl Fn(&ClientEvent) -> bool,
) -> ClientEvent {
    timeout(WAIT_TIMEOUT, async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for a state event")
}
