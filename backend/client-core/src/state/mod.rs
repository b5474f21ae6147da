//! Mirrored controller state.
//!
//! This module holds the client's copy of everything the controller
//! reports: version, configuration document, telemetry, timeslot, the
//! session standing and the two bounded histories.
//!
//! # Architecture
//!
//! State lives behind a [`StateHandle`]:
//! - Reads clone the requested piece out of an `Arc<RwLock<_>>`
//! - Mutations are crate-internal and happen only on the dispatch and
//!   connection paths
//! - Every applied change is announced on a `broadcast` channel of
//!   [`ClientEvent`], which is how callers observe the session without
//!   polling

pub mod history;
pub mod log_entry;

pub use history::{HISTORY_CAPACITY, HistoryBuffer};
pub use log_entry::{LogEntry, LogLevel};

use crate::protocol::{ConfigDocument, Telemetry};
use crate::session::{Session, SessionStatus};

use common::RedactedSecret;

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

const EVENT_CHANNEL_CAPACITY: usize = 256;

const CONNECT_MESSAGE: &str = "Connected to controller.";
const DISCONNECT_MESSAGE: &str = "Disconnected from controller.";

/// A change applied to the mirrored state.
///
/// Slow subscribers can lag and miss events; the mirrored state itself is
/// always current, so a lagged subscriber re-reads instead of replaying.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connected,
    Disconnected,
    Authenticated(bool),
    Log(LogEntry),
    Message(Value),
    Version(String),
    ConfigReplaced,
    TelemetryReplaced,
    TelemetryPatched,
    Timeslot(u32),
}

#[derive(Debug, Default)]
struct MirrorState {
    session: Session,
    version: String,
    config: Option<ConfigDocument>,
    telemetry: Telemetry,
    timeslot: u32,
    log_history: HistoryBuffer<LogEntry>,
    message_history: HistoryBuffer<Value>,
}

/// Shared access to the mirrored controller state.
///
/// This type is `Clone`; all clones share the same underlying state and
/// event channel.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<RwLock<MirrorState>>,
    events: broadcast::Sender<ClientEvent>,
}

impl StateHandle {
    pub(crate) fn new(session: Session) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(MirrorState {
                session,
                ..MirrorState::default()
            })),
            events,
        }
    }

    /// Subscribe to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.read().await.session.status()
    }

    /// Whether a socket to the controller is currently open.
    pub async fn connected(&self) -> bool {
        self.inner.read().await.session.connected()
    }

    /// The controller's verdict on the credential for this connection,
    /// `None` while no verdict arrived.
    pub async fn authenticated(&self) -> Option<bool> {
        self.inner.read().await.session.authenticated()
    }

    pub async fn version(&self) -> String {
        self.inner.read().await.version.clone()
    }

    pub async fn config(&self) -> Option<ConfigDocument> {
        self.inner.read().await.config.clone()
    }

    pub async fn telemetry(&self) -> Telemetry {
        self.inner.read().await.telemetry.clone()
    }

    pub async fn timeslot(&self) -> u32 {
        self.inner.read().await.timeslot
    }

    /// Log history, newest first.
    pub async fn log_entries(&self) -> Vec<LogEntry> {
        self.inner.read().await.log_history.snapshot()
    }

    /// Received message history, newest first.
    pub async fn messages(&self) -> Vec<Value> {
        self.inner.read().await.message_history.snapshot()
    }

    pub(crate) async fn credential(&self) -> Option<RedactedSecret> {
        self.inner.read().await.session.credential().cloned()
    }

    pub(crate) async fn set_credential(&self, credential: Option<RedactedSecret>) {
        self.inner.write().await.session.set_credential(credential);
    }

    /// A socket opened: session moves to `AwaitingAuth` and the connect
    /// marker joins the log history.
    pub(crate) async fn mark_connected(&self) {
        let entry = LogEntry::new(LogLevel::Info, CONNECT_MESSAGE);
        {
            let mut state = self.inner.write().await;
            state.session.on_open();
            state.log_history.push(entry.clone());
        }
        self.emit(ClientEvent::Connected);
        self.emit(ClientEvent::Log(entry));
    }

    /// The close path: disconnect marker if a session was up, then the
    /// session returns to `Disconnected` and telemetry is forgotten.
    pub(crate) async fn mark_disconnected(&self) {
        let was_connected;
        let had_telemetry;
        let entry = LogEntry::new(LogLevel::Info, DISCONNECT_MESSAGE);
        {
            let mut state = self.inner.write().await;
            was_connected = state.session.connected();
            had_telemetry = !state.telemetry.is_empty();
            if was_connected {
                state.log_history.push(entry.clone());
            }
            state.session.on_close();
            state.telemetry.reset();
        }
        if was_connected {
            self.emit(ClientEvent::Log(entry));
            self.emit(ClientEvent::Disconnected);
        }
        if had_telemetry {
            self.emit(ClientEvent::TelemetryReplaced);
        }
    }

    pub(crate) async fn set_auth(&self, accepted: bool) {
        self.inner.write().await.session.on_auth_reply(accepted);
        self.emit(ClientEvent::Authenticated(accepted));
    }

    pub(crate) async fn record_log(&self, entry: LogEntry) {
        self.inner.write().await.log_history.push(entry.clone());
        self.emit(ClientEvent::Log(entry));
    }

    pub(crate) async fn record_message(&self, message: Value) {
        self.inner
            .write()
            .await
            .message_history
            .push(message.clone());
        self.emit(ClientEvent::Message(message));
    }

    pub(crate) async fn set_version(&self, version: String) {
        self.inner.write().await.version = version.clone();
        self.emit(ClientEvent::Version(version));
    }

    pub(crate) async fn replace_config(&self, config: ConfigDocument) {
        self.inner.write().await.config = Some(config);
        self.emit(ClientEvent::ConfigReplaced);
    }

    pub(crate) async fn replace_telemetry(&self, telemetry: Telemetry) {
        self.inner.write().await.telemetry = telemetry;
        self.emit(ClientEvent::TelemetryReplaced);
    }

    pub(crate) async fn merge_telemetry(&self, partial: Map<String, Value>) {
        self.inner.write().await.telemetry.apply_update(partial);
        self.emit(ClientEvent::TelemetryPatched);
    }

    pub(crate) async fn set_timeslot(&self, timeslot: u32) {
        self.inner.write().await.timeslot = timeslot;
        self.emit(ClientEvent::Timeslot(timeslot));
    }

    fn emit(&self, event: ClientEvent) {
        // Send only fails when nobody subscribed, which is fine.
        let _ = self.events.send(event);
    }
}
