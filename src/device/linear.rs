// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary on/off actuator.

use tokio::sync::Mutex;

use crate::command::{CommandSender, DeviceCommand};
use crate::error::{Error, Result};
use crate::telemetry::Control;

use super::Action;

/// A digital actuator whose desired action maps directly onto a binary
/// output state: `Up` drives the pin to 1, anything else to 0.
///
/// Covers the alarm light, humidifier, circulation fan, power switch, and
/// generic pumps. The device tracks its last driven state and emits an
/// outbound command only when the new state differs, so redundant requests
/// are free and safe under concurrent dispatch.
#[derive(Debug, Default)]
pub struct LinearDevice {
    state: Mutex<u8>,
}

impl LinearDevice {
    /// Creates a device in the off (0) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the output toward the action's target state, enqueueing a
    /// command only on an actual transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the outbound queue is gone.
    pub async fn apply(
        &self,
        action: Action,
        ctrl: &Control,
        commands: &CommandSender,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let target = action.linear_state();
        if *state == target {
            return Ok(());
        }
        *state = target;

        let line = DeviceCommand::new(&ctrl.kind, ctrl.pin, i64::from(target)).to_json();
        commands.send(line).await.map_err(|_| Error::QueueClosed)
    }

    /// The last driven output state.
    pub async fn state(&self) -> u8 {
        *self.state.lock().await
    }
}
