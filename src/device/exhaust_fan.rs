// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PWM exhaust fan with empirical minimum-threshold calibration.

use tokio::sync::Mutex;

use crate::command::{CommandSender, DeviceCommand};
use crate::error::{Error, Result};
use crate::hardware::ExhaustFanSpec;
use crate::telemetry::Control;

use super::{Action, State};

/// Duty-cycle table in 10% increments, index 0 (off) to 10 (full).
pub const PWM_TABLE: [u8; 11] = [0, 25, 51, 76, 102, 127, 153, 178, 204, 229, 255];

#[derive(Debug, Default)]
struct FanState {
    current_idx: usize,
    threshold_idx: usize,
    threshold_determined: bool,
}

/// The exhaust fan.
///
/// The fan's minimum functional duty cycle is not known a priori: too low a
/// PWM value stalls the blades. Before closed-loop control is safe, the
/// device searches for the lowest table index whose measured RPM clears the
/// hardware floor.
///
/// Two entry points:
///
/// 1. **Calibration** ([`push_state`](Self::push_state)): while the
///    threshold is undetermined, each measured RPM below the floor advances
///    both the threshold index and the current index and emits the next
///    duty-cycle step. The first measurement at or above the floor freezes
///    the threshold at the current index.
/// 2. **Operation** ([`apply`](Self::apply)): only after calibration.
///    `Up` (raise temperature) steps the duty cycle down but never below
///    the calibrated threshold; `Down` steps it up but never past the end
///    of the table. Each actual index change emits the corresponding PWM
///    value; a call that would not move the index emits nothing.
#[derive(Debug)]
pub struct ExhaustFan {
    spec: ExhaustFanSpec,
    inner: Mutex<FanState>,
}

impl ExhaustFan {
    /// Creates an uncalibrated fan at duty index 0.
    #[must_use]
    pub fn new(spec: ExhaustFanSpec) -> Self {
        Self {
            spec,
            inner: Mutex::new(FanState::default()),
        }
    }

    /// Feeds one RPM measurement into the threshold search.
    ///
    /// No-op once the threshold has been determined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueClosed`] if the outbound queue is gone.
    pub async fn push_state(
        &self,
        state: State,
        ctrl: &Control,
        commands: &CommandSender,
    ) -> Result<()> {
        let mut fan = self.inner.lock().await;
        if fan.threshold_determined {
            return Ok(());
        }

        if state.value >= self.spec.rpm_floor {
            fan.threshold_determined = true;
            tracing::info!(
                threshold_idx = fan.threshold_idx,
                rpm = state.value,
                "Fan RPM threshold found"
            );
            return Ok(());
        }

        if fan.threshold_idx + 1 >= PWM_TABLE.len() {
            tracing::warn!(
                rpm = state.value,
                rpm_floor = self.spec.rpm_floor,
                "PWM table exhausted below RPM floor; fan stays uncalibrated"
            );
            return Ok(());
        }

        fan.threshold_idx += 1;
        fan.current_idx = fan.threshold_idx;
        let value = PWM_TABLE[fan.current_idx];
        drop(fan);

        self.emit(ctrl, value, commands).await
    }

    /// Steps the duty cycle one table entry per action, within bounds.
    ///
    /// No-op until calibration has completed.
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
        let mut fan = self.inner.lock().await;
        if !fan.threshold_determined {
            return Ok(());
        }

        match action {
            // Raising the temperature means slowing the fan, but never
            // below the known-working minimum.
            Action::Up => {
                if fan.current_idx <= fan.threshold_idx {
                    return Ok(());
                }
                fan.current_idx -= 1;
            }
            Action::Down => {
                if fan.current_idx + 1 >= PWM_TABLE.len() {
                    return Ok(());
                }
                fan.current_idx += 1;
            }
        }

        let value = PWM_TABLE[fan.current_idx];
        drop(fan);

        self.emit(ctrl, value, commands).await
    }

    async fn emit(&self, ctrl: &Control, value: u8, commands: &CommandSender) -> Result<()> {
        let line = DeviceCommand::new(&ctrl.kind, ctrl.pin, value).to_json();
        commands.send(line).await.map_err(|_| Error::QueueClosed)
    }

    /// Current duty-cycle table index.
    pub async fn current_index(&self) -> usize {
        self.inner.lock().await.current_idx
    }

    /// Calibrated minimum table index.
    pub async fn threshold_index(&self) -> usize {
        self.inner.lock().await.threshold_idx
    }

    /// Whether the threshold search has completed.
    pub async fn is_calibrated(&self) -> bool {
        self.inner.lock().await.threshold_determined
    }
}
