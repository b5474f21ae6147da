use crate::session_tests::helpers::{
    MockController, temp_store, unused_port, wait_for_event,
};

use client_core::connection::{ClientConfig, start_client};
use client_core::error::connection::ConnectionError;
use client_core::protocol::{ClientEnvelope, PageRequest};
use client_core::session::SessionStatus;
use client_core::state::ClientEvent;

use std::time::{Duration, Instant};

use serde_json::json;

/// **VALUE**: Verifies the very first request on a fresh connection is the
/// authentication handshake, with an empty secret when nothing is stored.
///
/// **WHY THIS MATTERS**: The controller times out sessions that do not
/// authenticate, and an operator without a saved secret still gets the
/// anonymous log stream. If the first request were anything else, every
/// fresh install would look dead.
///
/// **BUG THIS CATCHES**: Would catch another request slipping out before
/// the handshake, or the handshake being skipped without a credential.
#[tokio::test]
async fn given_fresh_client_when_connected_then_authenticates_first_with_empty_secret() {
    // GIVEN: A mock controller and a client with no stored credential
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let config = ClientConfig::new(&server.url).expect("valid url");

    // WHEN: The client starts
    let handle = start_client(config, store).await;

    // THEN: The first request is an empty-secret handshake
    let mut session = server.next_session().await;
    let first = session.recv_envelope().await;
    assert_eq!(first, ClientEnvelope::Authenticate(String::new()));

    handle.shutdown();
}

/// **VALUE**: Verifies a previously stored secret is presented on connect
/// without any operator action.
#[tokio::test]
async fn given_stored_credential_when_connected_then_handshake_carries_it() {
    // GIVEN: A store holding a secret from an earlier run
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    store.store_password("swordfish").expect("seed credential");
    let config = ClientConfig::new(&server.url).expect("valid url");

    // WHEN: The client starts
    let handle = start_client(config, store).await;

    // THEN: The handshake carries the stored secret
    let mut session = server.next_session().await;
    let first = session.recv_envelope().await;
    assert_eq!(first, ClientEnvelope::Authenticate(String::from("swordfish")));

    handle.shutdown();
}

/// **VALUE**: Verifies a confirmed handshake pulls the controller state in
/// the fixed order: version, config, telemetry, timeslot.
///
/// **BUG THIS CATCHES**: Would catch a dropped or reordered query, which
/// would leave parts of the mirror permanently empty.
#[tokio::test]
async fn given_accepted_auth_when_confirmed_then_state_queries_follow_in_order() {
    // GIVEN: A connected client past its handshake
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: The controller confirms the credential
    session.push(json!({"Authenticated": true}));

    // THEN: The four queries arrive in order
    assert_eq!(session.recv_envelope().await, ClientEnvelope::GetVersion);
    assert_eq!(session.recv_envelope().await, ClientEnvelope::GetConfig);
    assert_eq!(session.recv_envelope().await, ClientEnvelope::GetTelemetry);
    assert_eq!(session.recv_envelope().await, ClientEnvelope::GetTimeslot);

    handle.shutdown();
}

/// **VALUE**: Verifies a rejected handshake stays quiet: no state queries,
/// connection still up.
#[tokio::test]
async fn given_rejected_auth_when_replied_then_no_queries_sent() {
    // GIVEN: A connected client past its handshake
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: The controller rejects the credential
    session.push(json!({"Authenticated": false}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Authenticated(false))).await;

    // THEN: No queries follow and the session stays connected
    session.expect_no_envelope(Duration::from_millis(300)).await;
    assert_eq!(handle.state().authenticated().await, Some(false));
    assert!(handle.state().connected().await);

    handle.shutdown();
}

/// **VALUE**: Verifies a rejection clears only the in-memory credential:
/// the next connection authenticates empty while the stored secret
/// survives on disk.
///
/// **WHY THIS MATTERS**: Retrying a refused secret every second would
/// hammer the controller; deleting it from disk would destroy the
/// operator's saved credential over what may be a transient controller
/// misconfiguration.
#[tokio::test]
async fn given_rejected_credential_when_reconnected_then_empty_secret_presented() {
    // GIVEN: A client that authenticated with a stored secret
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    store.store_password("refused").expect("seed credential");
    let handle = start_client(
        ClientConfig::new(&server.url).expect("valid url"),
        store.clone(),
    )
    .await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    assert_eq!(
        session.recv_envelope().await,
        ClientEnvelope::Authenticate(String::from("refused"))
    );

    // WHEN: The controller rejects it and the connection drops
    session.push(json!({"Authenticated": false}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Authenticated(false))).await;
    session.close();

    // THEN: The reconnect handshake is empty
    let mut next = server.next_session().await;
    assert_eq!(
        next.recv_envelope().await,
        ClientEnvelope::Authenticate(String::new())
    );

    // AND: The stored copy is untouched
    let stored = store.load().expect("load");
    assert_eq!(stored.password.as_deref(), Some("refused"));

    handle.shutdown();
}

/// **VALUE**: Verifies pushed frames land in the mirror, including several
/// kinds batched into one frame.
#[tokio::test]
async fn given_state_frames_when_pushed_then_mirror_updates() {
    // GIVEN: A connected client
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: One frame carries both a version and a timeslot
    session.push(json!({"Version": "1.2.3", "Timeslot": 7}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Version(_))).await;
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Timeslot(_))).await;

    // THEN: Both values are mirrored
    assert_eq!(handle.state().version().await, "1.2.3");
    assert_eq!(handle.state().timeslot().await, 7);

    // WHEN: A log record and a received message arrive
    session.push(json!({"Log": [2, "amplifier fault"]}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Log(_))).await;
    session.push(json!({"Message": {"addr": 99, "data": "CQ"}}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Message(_))).await;

    // THEN: Both histories hold them, newest first
    let log = handle.state().log_entries().await;
    assert_eq!(log[0].message, "amplifier fault");
    let messages = handle.state().messages().await;
    assert_eq!(messages[0], json!({"addr": 99, "data": "CQ"}));

    handle.shutdown();
}

/// **VALUE**: Verifies a timeslot frame neither requires nor affects the
/// authentication verdict.
#[tokio::test]
async fn given_timeslot_before_verdict_when_pushed_then_auth_still_pending() {
    // GIVEN: A connected client with no verdict yet
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: A timeslot arrives before any verdict
    session.push(json!({"Timeslot": 5}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Timeslot(5))).await;

    // THEN: The timeslot is mirrored and the verdict is still pending
    assert_eq!(handle.state().timeslot().await, 5);
    assert_eq!(handle.state().authenticated().await, None);

    handle.shutdown();
}

/// **VALUE**: Verifies the close path and the fixed reconnect delay: a
/// dropped connection forgets telemetry and comes back roughly a second
/// later with a fresh handshake.
///
/// **BUG THIS CATCHES**: Would catch telemetry surviving a close, a dead
/// session after a server-side drop, or a runaway reconnect with no
/// delay.
#[tokio::test]
async fn given_server_close_when_dropped_then_telemetry_resets_and_client_reconnects() {
    // GIVEN: A connected client with telemetry mirrored
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let session = {
        let mut session = server.next_session().await;
        session.recv_envelope().await;
        session
    };
    session.push(json!({"Telemetry": {"node": {"uptime": 5}}}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::TelemetryReplaced)).await;
    assert!(!handle.state().telemetry().await.is_empty());

    // WHEN: The controller drops the connection
    let closed_at = Instant::now();
    session.close();
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Disconnected)).await;

    // THEN: The mirror reflects the loss
    assert_eq!(handle.state().status().await, SessionStatus::Disconnected);
    assert!(handle.state().telemetry().await.is_empty());

    // AND: The client reconnects after the fixed delay and
    // authenticates again
    let mut next = server.next_session().await;
    let first = next.recv_envelope().await;
    assert!(matches!(first, ClientEnvelope::Authenticate(_)));
    assert!(
        closed_at.elapsed() >= Duration::from_millis(900),
        "reconnected after only {:?}",
        closed_at.elapsed()
    );

    handle.shutdown();
}

/// **VALUE**: Verifies sends fail fast with `NotConnected` while no socket
/// is open, instead of queueing or blocking.
#[tokio::test]
async fn given_no_listener_when_sending_then_not_connected_error() {
    // GIVEN: A client pointed at a port with nothing listening
    let port = unused_port().await;
    let (_dir, store) = temp_store();
    let config = ClientConfig::new(&format!("ws://127.0.0.1:{port}")).expect("valid url");
    let handle = start_client(config, store).await;

    // WHEN: Sending while disconnected
    let result = handle.send(ClientEnvelope::GetVersion).await;

    // THEN: The send fails fast
    assert!(matches!(result, Err(ConnectionError::NotConnected { .. })));

    handle.shutdown();
}

/// **VALUE**: Verifies shutdown stops the reconnect loop for good.
#[tokio::test]
async fn given_running_client_when_shut_down_then_no_reconnect() {
    // GIVEN: A connected client
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: Shutting the client down
    handle.shutdown();
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Disconnected)).await;

    // THEN: No reconnect happens even past the reconnect delay
    server.expect_no_session(Duration::from_millis(2500)).await;
    assert!(matches!(
        handle.send(ClientEnvelope::GetVersion).await,
        Err(ConnectionError::NotConnected { .. })
    ));
}

/// **VALUE**: Verifies a page submission reaches the controller and its
/// receiver address is persisted for the next session's pre-fill.
#[tokio::test]
async fn given_page_submission_when_sent_then_envelope_delivered_and_address_persisted() {
    // GIVEN: An authenticated client
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(
        ClientConfig::new(&server.url).expect("valid url"),
        store.clone(),
    )
    .await;
    let mut session = server.next_session().await;
    session.recv_envelope().await;
    session.push(json!({"Authenticated": true}));
    for _ in 0..4 {
        session.recv_envelope().await;
    }

    // WHEN: Submitting a page
    let request = PageRequest::builder()
        .with_address(127)
        .with_data("RADIO CHECK")
        .build()
        .expect("valid page");
    handle.submit_page(request.clone()).await.expect("submit");

    // THEN: The controller receives it as sent
    assert_eq!(
        session.recv_envelope().await,
        ClientEnvelope::SendMessage(request)
    );

    // AND: The address is stored for the next session
    assert_eq!(store.load().expect("load").pager_address, Some(127));

    handle.shutdown();
}

/// **VALUE**: Verifies saving with no mirrored document is a quiet no-op,
/// and saving after a mirror pushes the document back verbatim.
#[tokio::test]
async fn given_config_mirror_when_saving_then_document_sent_back_only_if_present() {
    // GIVEN: A connected client with nothing mirrored yet
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: Saving before any config arrived
    let saved = handle.save_config().await.expect("save");

    // THEN: Nothing was sent
    assert!(!saved);
    session.expect_no_envelope(Duration::from_millis(300)).await;

    // GIVEN: A mirrored document
    let document = json!({"master": {"call": "DB0ABC"}, "transmitters": []});
    session.push(json!({"Config": document}));
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::ConfigReplaced)).await;

    // WHEN: Saving again
    let saved = handle.save_config().await.expect("save");

    // THEN: The document goes back verbatim
    assert!(saved);
    assert_eq!(
        session.recv_envelope().await,
        ClientEnvelope::SetConfig(document)
    );

    handle.shutdown();
}

/// **VALUE**: Verifies unparseable frames are dropped without killing the
/// session.
#[tokio::test]
async fn given_garbage_frame_when_pushed_then_session_survives() {
    // GIVEN: A connected client
    let mut server = MockController::start().await;
    let (_dir, store) = temp_store();
    let handle = start_client(ClientConfig::new(&server.url).expect("valid url"), store).await;
    let mut events = handle.subscribe();
    let mut session = server.next_session().await;
    session.recv_envelope().await;

    // WHEN: Garbage arrives, then a valid frame
    session.push_text("it's jammed");
    session.push_text("[1, 2");
    session.push(json!({"Version": "3.0.0"}));

    // THEN: The valid frame still lands
    wait_for_event(&mut events, |e| matches!(e, ClientEvent::Version(_))).await;
    assert_eq!(handle.state().version().await, "3.0.0");
    assert!(handle.state().connected().await);

    handle.shutdown();
}
