// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire shapes for sensor telemetry.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One telemetry sample from the microcontroller, plus the actuator
/// targets the decision for this sample should address.
///
/// Readings arrive as one JSON object per newline-terminated line:
///
/// ```json
/// {"sensor": "dh", "label": "Humidity", "value": 78, "unit": "%",
///  "controls": [{"pin": 4, "type": "digital", "device": "alarm_light"}]}
/// ```
///
/// A reading is immutable once constructed; it is produced by the framer
/// and consumed by exactly one controller invocation.
///
/// # Examples
///
/// ```
/// use cultiva::telemetry::parse_reading;
///
/// let line = r#"{"sensor":"dt","label":"Temperature","value":25.5,"unit":"C","controls":[]}"#;
/// let reading = parse_reading(line).unwrap();
/// assert_eq!(reading.sensor, "dt");
/// assert!((reading.value - 25.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sensor identifier; selects the controller.
    pub sensor: String,
    /// Human-readable label.
    pub label: String,
    /// Measured value, in `unit`.
    pub value: f64,
    /// Unit of measure.
    pub unit: String,
    /// Actuator targets for this reading's decision.
    #[serde(default)]
    pub controls: Vec<Control>,
}

/// A `(pin, type, device)` triple identifying one actuation target.
///
/// Carried unchanged from the reading to the device call; the device
/// echoes `kind` and `pin` back in its outbound command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Microcontroller pin number.
    pub pin: u16,
    /// Control type on the wire (`digital`, `analog`, `pwm`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Registered device identifier.
    pub device: String,
}

/// Parses one framed line as a [`SensorReading`].
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the line is not a valid reading.
pub fn parse_reading(line: &str) -> Result<SensorReading, ParseError> {
    serde_json::from_str(line).map_err(ParseError::Json)
}
