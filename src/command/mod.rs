// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound command building and queue-entry routing.
//!
//! Everything on the outbound queue is a single JSON line. Device commands
//! go to the microcontroller verbatim:
//!
//! ```json
//! {"command": "digital", "pin": 4, "value": 1}
//! ```
//!
//! Control commands are consumed by the dispatcher itself and never reach
//! the wire:
//!
//! ```json
//! {"command": "phase", "name": "Flowering"}
//! {"command": "shutdown"}
//! ```
//!
//! Producers build entries through the typed helpers here; the dispatcher
//! classifies each popped entry with [`classify`].

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Sending half of the outbound command queue.
///
/// Every producer — devices, the CLI boundary, the phase switcher — puts
/// JSON lines here; the dispatcher's command loop is the single consumer.
pub type CommandSender = tokio::sync::mpsc::Sender<String>;

/// Queue entry keyword for a phase switch.
const PHASE_KEYWORD: &str = "phase";

/// Queue entry keyword for a shutdown request.
const SHUTDOWN_KEYWORD: &str = "shutdown";

/// A command value on the wire: integer for digital/PWM levels, float for
/// analog setpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    /// Integer payload (digital state, PWM duty).
    Int(i64),
    /// Floating-point payload.
    Float(f64),
}

impl From<i64> for CommandValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u8> for CommandValue {
    fn from(v: u8) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for CommandValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// An actuation command destined for the microcontroller.
///
/// # Examples
///
/// ```
/// use cultiva::command::DeviceCommand;
///
/// let cmd = DeviceCommand::new("digital", 4, 1i64);
/// assert_eq!(cmd.to_json(), r#"{"command":"digital","pin":4,"value":1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Control type the firmware switches on (`digital`, `analog`, `pwm`).
    pub command: String,
    /// Target pin.
    pub pin: u16,
    /// Payload value.
    pub value: CommandValue,
}

impl DeviceCommand {
    /// Builds a device command.
    #[must_use]
    pub fn new(kind: &str, pin: u16, value: impl Into<CommandValue>) -> Self {
        Self {
            command: kind.to_string(),
            pin,
            value: value.into(),
        }
    }

    /// Serializes the command to its wire line.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Serialization of this shape cannot fail; fall back to an empty
        // line (which the writer ignores) rather than panicking.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Builds the queue entry requesting a growth-phase switch.
#[must_use]
pub fn phase_command(name: &str) -> String {
    serde_json::json!({ "command": PHASE_KEYWORD, "name": name }).to_string()
}

/// Builds the queue entry requesting process shutdown.
#[must_use]
pub fn shutdown_command() -> String {
    serde_json::json!({ "command": SHUTDOWN_KEYWORD }).to_string()
}

/// How the dispatcher should treat one popped queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEntry {
    /// Switch the active growth phase to the named catalog entry.
    PhaseSwitch(String),
    /// Stop the command loop and signal process shutdown.
    Shutdown,
    /// Anything else: forward the original line to the transport verbatim.
    Forward,
}

/// Classifies a queue entry.
///
/// # Errors
///
/// Returns [`ParseError::Json`] for entries that are not valid JSON and
/// [`ParseError::MissingField`] for a phase switch without a name. Such
/// entries are dropped by the dispatcher.
pub fn classify(entry: &str) -> Result<QueueEntry, ParseError> {
    let value: serde_json::Value = serde_json::from_str(entry)?;

    match value.get("command").and_then(serde_json::Value::as_str) {
        Some(PHASE_KEYWORD) => {
            let name = value
                .get("name")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| ParseError::MissingField("name".to_string()))?;
            Ok(QueueEntry::PhaseSwitch(name.to_string()))
        }
        Some(SHUTDOWN_KEYWORD) => Ok(QueueEntry::Shutdown),
        _ => Ok(QueueEntry::Forward),
    }
}
