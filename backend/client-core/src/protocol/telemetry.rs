//! Controller telemetry mirror.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Live controller readings, grouped the way the controller reports them.
///
/// Individual readings stay opaque JSON; the client only manages the three
/// top-level groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    pub node: Map<String, Value>,
    pub config: Map<String, Value>,
    pub messages: Map<String, Value>,
}

impl Telemetry {
    /// Apply a partial update: each named group is replaced wholesale.
    ///
    /// Groups absent from `partial` keep their current value. Entries for
    /// unknown groups or with non-object payloads are dropped.
    pub fn apply_update(&mut self, partial: Map<String, Value>) {
        for (group, value) in partial {
            let replacement = match value {
                Value::Object(map) => map,
                other => {
                    debug!("Dropping non-object telemetry update for {group}: {other}");
                    continue;
                }
            };
            match group.as_str() {
                "node" => self.node = replacement,
                "config" => self.config = replacement,
                "messages" => self.messages = replacement,
                _ => debug!("Dropping telemetry update for unknown group: {group}"),
            }
        }
    }

    /// Forget all readings. Runs whenever the connection closes.
    pub fn reset(&mut self) {
        *self = Telemetry::default();
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_empty() && self.config.is_empty() && self.messages.is_empty()
    }
}
