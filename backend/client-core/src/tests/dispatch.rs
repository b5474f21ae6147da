// Unit tests for frame dispatch

use crate::dispatch::dispatch_frame;
use crate::protocol::{ClientEnvelope, LogRecord, ServerFrame};
use crate::session::Session;
use crate::state::{LogLevel, StateHandle};

use common::RedactedSecret;

use serde_json::json;

fn fresh_state() -> StateHandle {
    StateHandle::new(Session::new(None))
}

/// **VALUE**: Verifies a confirmed authentication triggers the four state
/// queries in their fixed order.
///
/// **WHY THIS MATTERS**: The controller only volunteers log records and
/// telemetry updates; version, config, the telemetry baseline and the
/// timeslot must be pulled. Skipping the pull after auth leaves the whole
/// mirror empty even though the session looks healthy.
///
/// **BUG THIS CATCHES**: Would catch a dropped query, a reordering, or
/// queries fired on rejection.
#[tokio::test]
async fn given_accepted_auth_when_dispatched_then_four_queries_in_order() {
    // GIVEN: A connected state
    let state = fresh_state();
    state.mark_connected().await;

    // WHEN: The controller confirms the credential
    let follow_ups = dispatch_frame(&state, ServerFrame::Authenticated(true)).await;

    // THEN: The fixed query sequence comes back
    assert_eq!(
        follow_ups,
        vec![
            ClientEnvelope::GetVersion,
            ClientEnvelope::GetConfig,
            ClientEnvelope::GetTelemetry,
            ClientEnvelope::GetTimeslot,
        ]
    );
    assert_eq!(state.authenticated().await, Some(true));
}

/// **VALUE**: Verifies a rejection produces no queries and drops only the
/// in-memory credential.
#[tokio::test]
async fn given_rejected_auth_when_dispatched_then_no_queries_and_credential_dropped() {
    // GIVEN: A connected state holding a credential
    let state = StateHandle::new(Session::new(Some(RedactedSecret::new(String::from(
        "refused",
    )))));
    state.mark_connected().await;

    // WHEN: The controller rejects it
    let follow_ups = dispatch_frame(&state, ServerFrame::Authenticated(false)).await;

    // THEN: Nothing to send, verdict recorded, credential gone
    assert!(follow_ups.is_empty());
    assert_eq!(state.authenticated().await, Some(false));
    assert!(state.credential().await.is_none());
    assert!(state.connected().await);
}

#[tokio::test]
async fn given_version_frame_when_dispatched_then_version_mirrored() {
    let state = fresh_state();
    let follow_ups =
        dispatch_frame(&state, ServerFrame::Version(String::from("2.1.0"))).await;
    assert!(follow_ups.is_empty());
    assert_eq!(state.version().await, "2.1.0");
}

#[tokio::test]
async fn given_config_frame_when_dispatched_then_document_mirrored() {
    let state = fresh_state();
    let document = json!({"master": {"port": 1337}});
    dispatch_frame(&state, ServerFrame::Config(document.clone())).await;
    assert_eq!(state.config().await, Some(document));
}

/// **VALUE**: Verifies configuration snapshots are idempotent: the same
/// document dispatched twice mirrors exactly what one dispatch mirrors.
///
/// **WHY THIS MATTERS**: The controller re-sends the full document after
/// every save and on every pull, so replays of an unchanged snapshot are
/// routine traffic, not an edge case.
///
/// **BUG THIS CATCHES**: Would catch a merge-instead-of-replace mutation
/// that accumulates state across snapshots, or a config route leaking
/// into the version or log handling.
#[tokio::test]
async fn given_same_config_snapshot_twice_when_dispatched_then_mirror_unchanged() {
    // GIVEN: A state already mirroring a configuration document
    let state = fresh_state();
    let document = json!({"master": {"port": 1337}, "ptt": {"method": "gpio"}});
    dispatch_frame(&state, ServerFrame::Config(document.clone())).await;
    let after_first = state.config().await;

    // WHEN: The identical snapshot arrives again
    dispatch_frame(&state, ServerFrame::Config(document.clone())).await;

    // THEN: The mirror matches a single dispatch, neighbors untouched
    assert_eq!(state.config().await, after_first);
    assert_eq!(state.config().await, Some(document));
    assert_eq!(state.version().await, "");
    assert!(state.log_entries().await.is_empty());
}

#[tokio::test]
async fn given_timeslot_frame_when_dispatched_then_timeslot_mirrored() {
    let state = fresh_state();
    dispatch_frame(&state, ServerFrame::Timeslot(12)).await;
    assert_eq!(state.timeslot().await, 12);
}

/// **VALUE**: Verifies log records land in the history with their mapped
/// severity.
#[tokio::test]
async fn given_log_frame_when_dispatched_then_entry_recorded_with_level() {
    let state = fresh_state();

    dispatch_frame(
        &state,
        ServerFrame::Log(LogRecord {
            level_code: Some(1),
            text: String::from("PA overtemperature"),
        }),
    )
    .await;

    let log = state.log_entries().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].level, LogLevel::Error);
    assert_eq!(log[0].message, "PA overtemperature");
}

#[tokio::test]
async fn given_message_frame_when_dispatched_then_recorded_newest_first() {
    let state = fresh_state();

    dispatch_frame(&state, ServerFrame::Message(json!({"seq": 1}))).await;
    dispatch_frame(&state, ServerFrame::Message(json!({"seq": 2}))).await;

    let messages = state.messages().await;
    assert_eq!(messages, vec![json!({"seq": 2}), json!({"seq": 1})]);
}

/// **VALUE**: Verifies the timeslot route is independent of the
/// authentication route: a timeslot never changes the auth verdict.
#[tokio::test]
async fn given_timeslot_frame_when_dispatched_then_auth_state_untouched() {
    // GIVEN: A connected, unauthenticated state
    let state = fresh_state();
    state.mark_connected().await;
    assert_eq!(state.authenticated().await, None);

    // WHEN: A timeslot arrives
    dispatch_frame(&state, ServerFrame::Timeslot(3)).await;

    // THEN: The verdict is still pending
    assert_eq!(state.authenticated().await, None);
    assert_eq!(state.timeslot().await, 3);
}

#[tokio::test]
async fn given_unknown_frame_when_dispatched_then_state_untouched() {
    let state = fresh_state();
    let follow_ups =
        dispatch_frame(&state, ServerFrame::Unknown(String::from("Firmware"))).await;
    assert!(follow_ups.is_empty());
    assert_eq!(state.version().await, "");
    assert!(state.log_entries().await.is_empty());
}
