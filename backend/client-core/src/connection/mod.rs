//! The controller session task and its handle.
//!
//! One background task owns the connection for the life of the client:
//! connect, authenticate, mirror frames, and on any close retry after a
//! fixed delay, forever. Callers hold a [`ControllerHandle`] to send
//! requests and a [`StateHandle`] to observe the mirror.
//!
//! # Send contract
//!
//! Requests are only written to a currently open socket. With no socket
//! up, [`ControllerHandle::send`] fails fast with
//! [`ConnectionError::NotConnected`]; nothing is queued for later.

use crate::credentials::CredentialStore;
use crate::dispatch::dispatch_frame;
use crate::error::connection::ConnectionError;
use crate::protocol::{ClientEnvelope, PageRequest, decode_frames};
use crate::session::Session;
use crate::state::{ClientEvent, StateHandle};

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio::spawn as TokioSpawn;
use tokio::sync::{Mutex, broadcast};
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

/// Pause between the end of one connection and the next attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1000);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type SinkSlot = Arc<Mutex<Option<WsSink>>>;

/// Where the session connects.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    endpoint: Url,
}

impl ClientConfig {
    /// Parse and validate the controller endpoint.
    #[track_caller]
    pub fn new(endpoint: &str) -> Result<Self, ConnectionError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConnectionError::Endpoint {
            message: format!("Invalid controller URL {endpoint}: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(ConnectionError::Endpoint {
                message: format!("Controller URL must use ws or wss: {endpoint}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Start the controller session.
///
/// Loads the stored credential, spawns the session task and returns its
/// handle. The task connects immediately and keeps reconnecting until
/// [`ControllerHandle::shutdown`] is called.
pub async fn start_client(config: ClientConfig, store: CredentialStore) -> ControllerHandle {
    let stored = store.load_or_default();
    let credential = stored.password.map(RedactedSecret::new);

    let state = StateHandle::new(Session::new(credential));
    let sink: SinkSlot = Arc::new(Mutex::new(None));
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let handle = ControllerHandle {
        state: state.clone(),
        sink: Arc::clone(&sink),
        store,
        shutdown_tx,
    };

    TokioSpawn(run_session(config, state, sink, shutdown_rx));

    handle
}

/// Caller-facing handle to a running session.
///
/// This type is `Clone`; all clones drive the same connection.
#[derive(Clone)]
pub struct ControllerHandle {
    state: StateHandle,
    sink: SinkSlot,
    store: CredentialStore,
    shutdown_tx: broadcast::Sender<()>,
}

impl ControllerHandle {
    /// The mirrored controller state.
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Subscribe to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.state.subscribe()
    }

    /// Send one request on the open connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotConnected`] when no socket is open,
    /// [`ConnectionError::Transport`] when the write fails.
    pub async fn send(&self, envelope: ClientEnvelope) -> Result<(), ConnectionError> {
        transmit_via(&self.sink, &envelope).await
    }

    /// Present a new operator secret.
    ///
    /// The secret becomes the in-memory credential and is persisted before
    /// the controller has answered; a later rejection clears only the
    /// in-memory copy.
    pub async fn authenticate(&self, secret: &str) -> Result<(), ConnectionError> {
        self.state
            .set_credential(Some(RedactedSecret::new(secret.to_owned())))
            .await;
        if let Err(e) = self.store.store_password(secret) {
            warn!("Failed to persist credential: {e}");
        }
        self.send(ClientEnvelope::Authenticate(secret.to_owned()))
            .await
    }

    /// Submit one page, persisting its receiver address first.
    pub async fn submit_page(&self, request: PageRequest) -> Result<(), ConnectionError> {
        if let Err(e) = self.store.store_address(request.payload.address) {
            warn!("Failed to persist pager address: {e}");
        }
        self.send(ClientEnvelope::SendMessage(request)).await
    }

    /// Push the mirrored configuration document back to the controller.
    ///
    /// Returns `Ok(false)` without sending when no document has been
    /// mirrored yet.
    pub async fn save_config(&self) -> Result<bool, ConnectionError> {
        match self.state.config().await {
            Some(config) => {
                self.send(ClientEnvelope::SetConfig(config)).await?;
                Ok(true)
            }
            None => {
                debug!("No configuration document mirrored yet, nothing to save");
                Ok(false)
            }
        }
    }

    /// Ask the controller to restore its default configuration.
    pub async fn reset_config(&self) -> Result<(), ConnectionError> {
        self.send(ClientEnvelope::DefaultConfig).await
    }

    /// Trigger a test transmission.
    pub async fn run_test(&self) -> Result<(), ConnectionError> {
        self.send(ClientEnvelope::Test).await
    }

    /// Stop the session task and close any open socket.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// The session task: connect, handshake, mirror, reconnect. Runs until a
/// shutdown arrives.
async fn run_session(
    config: ClientConfig,
    state: StateHandle,
    sink: SinkSlot,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    'session: loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        debug!("Connecting to controller at {}", config.endpoint);

        match connect_async(config.endpoint.as_str()).await {
            Ok((ws_stream, _)) => {
                let (mut ws_sink, mut ws_stream) = ws_stream.split();

                state.mark_connected().await;

                // The credential presents itself before anything else can
                // be written; an absent credential still authenticates,
                // with an empty secret.
                let secret = match state.credential().await {
                    Some(secret) => secret.as_str().to_owned(),
                    None => String::new(),
                };
                let handshake = ClientEnvelope::Authenticate(secret);
                if let Err(e) = transmit(&mut ws_sink, &handshake).await {
                    warn!("Handshake send failed: {e}");
                }
                *sink.lock().await = Some(ws_sink);

                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            info!("Controller session shutting down");
                            close_socket(&sink).await;
                            state.mark_disconnected().await;
                            break 'session;
                        }
                        message = ws_stream.next() => match message {
                            Some(Ok(Message::Text(text))) => {
                                for frame in decode_frames(text.as_str()) {
                                    for follow_up in dispatch_frame(&state, frame).await {
                                        if let Err(e) = transmit_via(&sink, &follow_up).await {
                                            warn!("Follow-up query failed: {e}");
                                        }
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) => {
                                info!("Controller closed the session");
                                break;
                            }
                            Some(Ok(Message::Binary(_))) => {
                                debug!("Ignoring binary frame from controller");
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                warn!("Controller transport error: {e}");
                                break;
                            }
                            None => break,
                        }
                    }
                }

                close_socket(&sink).await;
                state.mark_disconnected().await;
            }
            Err(e) => {
                warn!(
                    "Failed to connect to controller at {}: {e}",
                    config.endpoint
                );
                state.mark_disconnected().await;
            }
        }

        tokio::select! {
            _ = sleep(RECONNECT_DELAY) => {}
            _ = shutdown_rx.recv() => {
                info!("Controller session shutting down");
                break;
            }
        }
    }

    info!("Controller session task stopped");
}

async fn close_socket(sink: &SinkSlot) {
    if let Some(mut ws_sink) = sink.lock().await.take() {
        let _ = ws_sink.close().await;
    }
}

/// Serialize and write one envelope to the given sink.
async fn transmit(sink: &mut WsSink, envelope: &ClientEnvelope) -> Result<(), ConnectionError> {
    let json = serde_json::to_string(envelope).map_err(|e| ConnectionError::Encode {
        message: format!("Failed to encode {}: {e}", envelope.kind()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    debug!("Sending {envelope:?}");

    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| ConnectionError::Transport {
            message: format!("Failed to send {}: {e}", envelope.kind()),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Write through the shared sink slot, failing fast when it is empty.
async fn transmit_via(sink: &SinkSlot, envelope: &ClientEnvelope) -> Result<(), ConnectionError> {
    let mut guard = sink.lock().await;
    let ws_sink = guard.as_mut().ok_or_else(|| ConnectionError::NotConnected {
        message: format!(
            "Cannot send {}: no open controller connection",
            envelope.kind()
        ),
        location: ErrorLocation::from(Location::caller()),
    })?;

    transmit(ws_sink, envelope).await
}
