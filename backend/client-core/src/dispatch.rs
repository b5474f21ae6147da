//! Routing of decoded frames into the mirrored state.

use crate::protocol::{ClientEnvelope, ServerFrame};
use crate::state::{LogEntry, LogLevel, StateHandle};

use log::{info, warn};

/// Apply one decoded frame to the state.
///
/// Returns the follow-up requests the connection should send: a confirmed
/// authentication triggers the version, config, telemetry and timeslot
/// queries, in that order. Every other frame returns nothing.
pub async fn dispatch_frame(state: &StateHandle, frame: ServerFrame) -> Vec<ClientEnvelope> {
    match frame {
        ServerFrame::Log(record) => {
            let entry = LogEntry::new(LogLevel::from_code(record.level_code), record.text);
            state.record_log(entry).await;
        }
        ServerFrame::Version(version) => {
            state.set_version(version).await;
        }
        ServerFrame::Config(config) => {
            state.replace_config(config).await;
        }
        ServerFrame::Telemetry(telemetry) => {
            state.replace_telemetry(telemetry).await;
        }
        ServerFrame::TelemetryUpdate(partial) => {
            state.merge_telemetry(partial).await;
        }
        ServerFrame::Timeslot(slot) => {
            state.set_timeslot(slot).await;
        }
        ServerFrame::Authenticated(accepted) => {
            state.set_auth(accepted).await;
            if accepted {
                info!("Authenticated, querying controller state");
                return vec![
                    ClientEnvelope::GetVersion,
                    ClientEnvelope::GetConfig,
                    ClientEnvelope::GetTelemetry,
                    ClientEnvelope::GetTimeslot,
                ];
            }
            warn!("Controller rejected the credential");
        }
        ServerFrame::Message(message) => {
            state.record_message(message).await;
        }
        ServerFrame::Unknown(kind) => {
            warn!("Ignoring unknown message kind: {kind}");
        }
    }
    Vec::new()
}
