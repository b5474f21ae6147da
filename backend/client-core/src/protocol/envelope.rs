//! Outbound requests to the controller.

use crate::protocol::{ConfigDocument, PageRequest};

use std::fmt;

use serde::{Deserialize, Serialize};

/// One request to the controller, externally tagged on the wire.
///
/// Unit variants serialize to a bare JSON string (`"GetVersion"`), payload
/// variants to a single-key object (`{"Authenticate": "..."}`), which is
/// exactly the framing the controller expects.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientEnvelope {
    /// Present the operator secret. Always the first request on a
    /// fresh connection.
    Authenticate(String),
    /// Replace the controller's configuration with the mirrored document.
    SetConfig(ConfigDocument),
    /// Ask the controller to restore its built-in default configuration.
    DefaultConfig,
    /// Submit one page for transmission.
    SendMessage(PageRequest),
    /// Query the controller software version.
    GetVersion,
    /// Query the current configuration document.
    GetConfig,
    /// Query the full telemetry snapshot.
    GetTelemetry,
    /// Query the current transmission timeslot.
    GetTimeslot,
    /// Trigger a test transmission.
    Test,
}

// Hand-written so the operator secret never reaches the logs.
impl fmt::Debug for ClientEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientEnvelope::Authenticate(_) => write!(f, "Authenticate([REDACTED])"),
            ClientEnvelope::SetConfig(_) => write!(f, "SetConfig(..)"),
            ClientEnvelope::DefaultConfig => write!(f, "DefaultConfig"),
            ClientEnvelope::SendMessage(request) => {
                f.debug_tuple("SendMessage").field(request).finish()
            }
            ClientEnvelope::GetVersion => write!(f, "GetVersion"),
            ClientEnvelope::GetConfig => write!(f, "GetConfig"),
            ClientEnvelope::GetTelemetry => write!(f, "GetTelemetry"),
            ClientEnvelope::GetTimeslot => write!(f, "GetTimeslot"),
            ClientEnvelope::Test => write!(f, "Test"),
        }
    }
}

impl ClientEnvelope {
    /// Short name of the request kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEnvelope::Authenticate(_) => "Authenticate",
            ClientEnvelope::SetConfig(_) => "SetConfig",
            ClientEnvelope::DefaultConfig => "DefaultConfig",
            ClientEnvelope::SendMessage(_) => "SendMessage",
            ClientEnvelope::GetVersion => "GetVersion",
            ClientEnvelope::GetConfig => "GetConfig",
            ClientEnvelope::GetTelemetry => "GetTelemetry",
            ClientEnvelope::GetTimeslot => "GetTimeslot",
            ClientEnvelope::Test => "Test",
        }
    }
}
