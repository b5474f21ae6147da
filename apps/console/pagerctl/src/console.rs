//! The interactive operator console.
//!
//! Runs two streams side by side: state change notifications from the
//! session task and operator input lines from stdin. Controller log
//! records are replayed through the local log facade under the
//! `controller` target, so they land in the same sinks as local logs.

use crate::commands::{ConsoleCommand, USAGE, parse};
use crate::error::ConsoleError;

use client_core::connection::ControllerHandle;
use client_core::credentials::CredentialStore;
use client_core::error::connection::ConnectionError;
use client_core::protocol::PageRequest;
use client_core::session::SessionStatus;
use client_core::state::ClientEvent;

use common::ErrorLocation;

use std::panic::Location;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// Log target for records replayed from the controller.
const CONTROLLER_LOG_TARGET: &str = "controller";

/// Drive the console until the operator quits or stdin closes.
pub async fn run(handle: ControllerHandle, store: CredentialStore) -> Result<(), ConsoleError> {
    let mut events = handle.subscribe();
    let mut lines = BufReader::new(stdin()).lines();

    println!("{USAGE}");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(event),
                // The mirror is always current, nothing to replay.
                Err(RecvError::Lagged(missed)) => debug!("Dropped {missed} state events"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let line = line.map_err(|e| ConsoleError::Console {
                    message: format!("Failed to read operator input: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                let Some(line) = line else {
                    break;
                };
                match parse(&line) {
                    Ok(Some(command)) => {
                        if execute(&handle, &store, command).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    handle.shutdown();
    info!("pagerctl exiting");
    Ok(())
}

/// Run one command. Returns `true` when the console should exit.
///
/// Command failures are reported to the operator and never end the
/// console; the session task keeps the connection alive regardless.
async fn execute(
    handle: &ControllerHandle,
    store: &CredentialStore,
    command: ConsoleCommand,
) -> bool {
    match command {
        ConsoleCommand::Auth(secret) => {
            report(handle.authenticate(&secret).await, "Credential presented");
        }
        ConsoleCommand::Page { address, text } => {
            submit_page(handle, store, address, text).await;
        }
        ConsoleCommand::Save => match handle.save_config().await {
            Ok(true) => info!("Configuration sent to controller"),
            Ok(false) => println!("No configuration mirrored yet"),
            Err(e) => warn!("{e}"),
        },
        ConsoleCommand::Reset => {
            report(
                handle.reset_config().await,
                "Default configuration requested",
            );
        }
        ConsoleCommand::Test => {
            report(handle.run_test().await, "Test transmission requested");
        }
        ConsoleCommand::Status => print_status(handle, store).await,
        ConsoleCommand::Log => print_log(handle).await,
        ConsoleCommand::Messages => print_messages(handle).await,
        ConsoleCommand::Help => println!("{USAGE}"),
        ConsoleCommand::Quit => return true,
    }
    false
}

fn report(result: Result<(), ConnectionError>, success: &str) {
    match result {
        Ok(()) => info!("{success}"),
        Err(e) => warn!("{e}"),
    }
}

/// An explicit address wins; otherwise the last persisted one is reused.
pub(crate) fn resolve_address(explicit: Option<u32>, store: &CredentialStore) -> Option<u32> {
    explicit.or_else(|| store.load_or_default().pager_address)
}

/// Build and submit one page, falling back to the last used address.
async fn submit_page(
    handle: &ControllerHandle,
    store: &CredentialStore,
    address: Option<u32>,
    text: String,
) {
    let address = match resolve_address(address, store) {
        Some(address) => address,
        None => {
            println!("No receiver address on record; use: page <addr> <text>");
            return;
        }
    };

    let request = match PageRequest::builder()
        .with_id(Uuid::new_v4().to_string())
        .with_address(address)
        .with_data(text)
        .build()
    {
        Ok(request) => request,
        Err(e) => {
            println!("{e}");
            return;
        }
    };

    report(
        handle.submit_page(request).await,
        "Page handed to controller",
    );
}

/// Print one state change notification.
///
/// Connection transitions and authentication verdicts are already logged
/// where they happen; repeating them here would print them twice.
fn print_event(event: ClientEvent) {
    match event {
        ClientEvent::Connected | ClientEvent::Disconnected => {}
        ClientEvent::Authenticated(_) => {}
        ClientEvent::Log(entry) => log::log!(
            target: CONTROLLER_LOG_TARGET,
            entry.level.as_log_level(),
            "{}",
            entry.message
        ),
        ClientEvent::Message(message) => {
            info!(target: CONTROLLER_LOG_TARGET, "Message received: {message}");
        }
        ClientEvent::Version(version) => info!("Controller version {version}"),
        ClientEvent::ConfigReplaced => info!("Configuration document mirrored"),
        ClientEvent::TelemetryReplaced => debug!("Telemetry replaced"),
        ClientEvent::TelemetryPatched => debug!("Telemetry updated"),
        ClientEvent::Timeslot(slot) => info!("Transmitting in timeslot {slot}"),
    }
}

async fn print_status(handle: &ControllerHandle, store: &CredentialStore) {
    let state = handle.state();
    let status = state.status().await;
    let version = state.version().await;
    let timeslot = state.timeslot().await;
    let telemetry = state.telemetry().await;
    let config = state.config().await;
    let stored = store.load_or_default();

    println!("Connection:    {}", describe_status(status));
    if version.is_empty() {
        println!("Version:       unknown");
    } else {
        println!("Version:       {version}");
    }
    println!("Timeslot:      {timeslot}");
    println!(
        "Telemetry:     {} node, {} config, {} message entries",
        telemetry.node.len(),
        telemetry.config.len(),
        telemetry.messages.len()
    );
    println!(
        "Configuration: {}",
        if config.is_some() {
            "mirrored"
        } else {
            "not mirrored"
        }
    );
    match stored.pager_address {
        Some(address) => println!("Last address:  {address}"),
        None => println!("Last address:  none"),
    }
}

fn describe_status(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Disconnected => "disconnected",
        SessionStatus::AwaitingAuth => "connected, awaiting authentication",
        SessionStatus::Authenticated => "connected, authenticated",
        SessionStatus::Unauthenticated => "connected, credential rejected",
    }
}

async fn print_log(handle: &ControllerHandle) {
    let entries = handle.state().log_entries().await;
    if entries.is_empty() {
        println!("No controller log entries yet");
        return;
    }
    for entry in entries {
        println!("{entry}");
    }
}

async fn print_messages(handle: &ControllerHandle) {
    let messages = handle.state().messages().await;
    if messages.is_empty() {
        println!("No messages received yet");
        return;
    }
    for message in messages {
        let rendered =
            serde_json::to_string_pretty(&message).unwrap_or_else(|_| message.to_string());
        println!("{rendered}");
    }
}
