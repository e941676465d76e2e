// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime settings for the control loop.

use std::env;

/// Default serial device path.
const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";

/// Default baud rate for the microcontroller link.
const DEFAULT_BAUD_RATE: u32 = 9600;

/// Runtime settings, resolved once at startup.
///
/// Values come from environment variables with sensible defaults:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `SERIAL_PORT` | `/dev/ttyACM0` | Serial device path |
/// | `BAUD_RATE` | `9600` | Link baud rate |
/// | `APP_MODE` | unset | `raw` logs raw lines instead of dispatching |
///
/// # Examples
///
/// ```
/// use cultiva::config::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.baud_rate, 9600);
/// assert!(!settings.raw_mode);
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    /// Serial device path.
    pub serial_port: String,
    /// Baud rate for the serial link.
    pub baud_rate: u32,
    /// When set, inbound lines are logged verbatim and not dispatched.
    /// Used for wire-protocol diagnosis.
    pub raw_mode: bool,
}

impl Settings {
    /// Builds settings from the process environment.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let serial_port =
            env::var("SERIAL_PORT").unwrap_or_else(|_| DEFAULT_SERIAL_PORT.to_string());
        let baud_rate = env::var("BAUD_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BAUD_RATE);
        let raw_mode = env::var("APP_MODE").is_ok_and(|v| v == "raw");

        Self {
            serial_port,
            baud_rate,
            raw_mode,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            raw_mode: false,
        }
    }
}
