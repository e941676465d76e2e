// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stateful actuator devices.
//!
//! A device turns an [`Action`] (or, for the exhaust fan, a raw [`State`]
//! push) into at most one outbound command. Devices are idempotent with
//! respect to their observed state — a request that would not change
//! anything emits nothing — and each instance serializes concurrent
//! callers behind its own lock.

mod exhaust_fan;
mod linear;
mod water_pump;

use crate::command::CommandSender;
use crate::error::Result;
use crate::telemetry::Control;

pub use exhaust_fan::ExhaustFan;
pub use linear::LinearDevice;
pub use water_pump::WaterPump;

/// Directive to a device in response to a sensor measurement.
///
/// `Up` increases the measured quantity (raise humidity, open a valve),
/// `Down` decreases it. The physical meaning is device-specific: for the
/// exhaust fan, `Down` (lower the temperature) spins the fan *faster*.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Increase the controlled quantity.
    Up,
    /// Decrease the controlled quantity.
    Down,
}

impl Action {
    /// The binary output state a linear device drives for this action.
    #[must_use]
    pub fn linear_state(self) -> u8 {
        match self {
            Self::Up => 1,
            Self::Down => 0,
        }
    }
}

/// A raw measured value pushed directly to a device, bypassing the
/// action layer. Used only by the exhaust-fan calibration path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// The measured value (fan RPM).
    pub value: f64,
}

impl State {
    /// Wraps a raw measurement.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// A registered actuator.
///
/// All devices accept `(Action, Control)` pairs through [`apply`]. The
/// exhaust fan additionally accepts raw [`State`] pushes through
/// [`push_state`] while its calibration is running; other devices ignore
/// state pushes. The water pump exposes a runtime estimate through
/// [`estimate_runtime`].
///
/// [`apply`]: DeviceKind::apply
/// [`push_state`]: DeviceKind::push_state
/// [`estimate_runtime`]: DeviceKind::estimate_runtime
#[derive(Debug)]
pub enum DeviceKind {
    /// Binary on/off actuator.
    Linear(LinearDevice),
    /// PWM exhaust fan with threshold calibration.
    ExhaustFan(ExhaustFan),
    /// Irrigation pump with runtime estimation.
    WaterPump(WaterPump),
}

impl DeviceKind {
    /// Applies an action, enqueueing at most one outbound command.
    ///
    /// # Errors
    ///
    /// Returns an error only if the outbound queue is closed.
    pub async fn apply(
        &self,
        action: Action,
        ctrl: &Control,
        commands: &CommandSender,
    ) -> Result<()> {
        match self {
            Self::Linear(device) => device.apply(action, ctrl, commands).await,
            Self::ExhaustFan(device) => device.apply(action, ctrl, commands).await,
            Self::WaterPump(device) => device.apply(action, ctrl, commands).await,
        }
    }

    /// Pushes a raw measured state to the device.
    ///
    /// Only the exhaust fan consumes these (for its threshold search);
    /// other devices log and ignore them.
    ///
    /// # Errors
    ///
    /// Returns an error only if the outbound queue is closed.
    pub async fn push_state(
        &self,
        state: State,
        ctrl: &Control,
        commands: &CommandSender,
    ) -> Result<()> {
        match self {
            Self::ExhaustFan(device) => device.push_state(state, ctrl, commands).await,
            Self::Linear(_) | Self::WaterPump(_) => {
                tracing::debug!(device = %ctrl.device, "Device ignores raw state pushes");
                Ok(())
            }
        }
    }

    /// Estimates how long the device must run to move the controlled
    /// quantity from `current` to `target`, in seconds.
    ///
    /// Returns `None` for devices without a runtime model.
    #[must_use]
    pub fn estimate_runtime(&self, current: f64, target: f64) -> Option<f64> {
        match self {
            Self::WaterPump(pump) => Some(pump.estimate_runtime(current, target)),
            Self::Linear(_) | Self::ExhaustFan(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::PumpSpec;
    use tokio::sync::mpsc;

    fn control(device: &str) -> Control {
        Control {
            pin: 4,
            kind: "digital".to_string(),
            device: device.to_string(),
        }
    }

    #[test]
    fn action_linear_states() {
        assert_eq!(Action::Up.linear_state(), 1);
        assert_eq!(Action::Down.linear_state(), 0);
    }

    #[tokio::test]
    async fn linear_device_ignores_state_push() {
        let device = DeviceKind::Linear(LinearDevice::new());
        let (tx, mut rx) = mpsc::channel(8);

        device
            .push_state(State::new(900.0), &control("alarm_light"), &tx)
            .await
            .unwrap();

        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn only_the_pump_estimates_runtime() {
        let linear = DeviceKind::Linear(LinearDevice::new());
        let pump = DeviceKind::WaterPump(WaterPump::new(PumpSpec::default()));

        assert!(linear.estimate_runtime(40.0, 60.0).is_none());
        assert!(pump.estimate_runtime(40.0, 60.0).is_some());
    }
}
