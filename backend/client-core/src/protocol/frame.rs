//! Inbound frame decoding.
//!
//! The controller batches message kinds: one JSON object may carry a
//! `Version` and a `Timeslot` at the same time. Decoding therefore yields a
//! list of frames, and a bad payload under one key never discards its
//! siblings.

use crate::protocol::{ConfigDocument, Telemetry};

use log::{debug, warn};
use serde_json::{Map, Value};

/// A raw backend log record, `[level_code, text]` on the wire.
///
/// Both elements are optional in practice; missing pieces fall back to
/// neutral values instead of failing the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level_code: Option<i64>,
    pub text: String,
}

/// One decoded message from the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    Log(LogRecord),
    Version(String),
    Config(ConfigDocument),
    Telemetry(Telemetry),
    TelemetryUpdate(Map<String, Value>),
    Timeslot(u32),
    Authenticated(bool),
    Message(Value),
    Unknown(String),
}

/// Decode one text frame into the message kinds it carries.
///
/// Malformed frames (bad JSON, non-object payloads) decode to an empty list.
/// A known key whose payload has the wrong shape is skipped; sibling keys
/// are still processed.
pub fn decode_frames(text: &str) -> Vec<ServerFrame> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            debug!("Discarding malformed frame: {e}");
            return Vec::new();
        }
    };

    let entries = match value {
        Value::Object(map) => map,
        other => {
            debug!("Discarding non-object frame: {other}");
            return Vec::new();
        }
    };

    let mut frames = Vec::with_capacity(entries.len());
    for (key, payload) in entries {
        match key.as_str() {
            "Log" => frames.push(ServerFrame::Log(decode_log_record(&payload))),
            "Version" => match serde_json::from_value::<String>(payload) {
                Ok(version) => frames.push(ServerFrame::Version(version)),
                Err(e) => warn!("Skipping malformed Version payload: {e}"),
            },
            "Config" => frames.push(ServerFrame::Config(payload)),
            "Telemetry" => match serde_json::from_value::<Telemetry>(payload) {
                Ok(telemetry) => frames.push(ServerFrame::Telemetry(telemetry)),
                Err(e) => warn!("Skipping malformed Telemetry payload: {e}"),
            },
            "TelemetryUpdate" => match payload {
                Value::Object(partial) => frames.push(ServerFrame::TelemetryUpdate(partial)),
                other => warn!("Skipping non-object TelemetryUpdate payload: {other}"),
            },
            "Timeslot" => match serde_json::from_value::<u32>(payload) {
                Ok(slot) => frames.push(ServerFrame::Timeslot(slot)),
                Err(e) => warn!("Skipping malformed Timeslot payload: {e}"),
            },
            "Authenticated" => match serde_json::from_value::<bool>(payload) {
                Ok(accepted) => frames.push(ServerFrame::Authenticated(accepted)),
                Err(e) => warn!("Skipping malformed Authenticated payload: {e}"),
            },
            "Message" => frames.push(ServerFrame::Message(payload)),
            _ => frames.push(ServerFrame::Unknown(key)),
        }
    }
    frames
}

fn decode_log_record(payload: &Value) -> LogRecord {
    LogRecord {
        level_code: payload.get(0).and_then(Value::as_i64),
        text: payload
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
    }
}
