// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exhaust-fan RPM feedback forwarding.

use crate::device::State;
use crate::error::{Error, ParseError, Result};
use crate::telemetry::SensorReading;

use super::Context;

/// Forwards measured fan RPM straight to the exhaust-fan device.
///
/// No hysteresis and no dead zone here: the device owns the calibration
/// state machine and decides itself whether a measurement changes
/// anything.
#[derive(Debug, Default)]
pub struct FanSpeedController;

impl FanSpeedController {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Pushes the measured RPM to the device named by the first control.
    ///
    /// # Errors
    ///
    /// Returns an error for a reading without controls, an unregistered
    /// device, or a closed queue.
    pub async fn decide(&self, reading: &SensorReading, ctx: &Context) -> Result<()> {
        let ctrl = reading
            .controls
            .first()
            .ok_or_else(|| ParseError::MissingField("controls".to_string()))?;
        let device = ctx
            .device(&ctrl.device)
            .ok_or_else(|| Error::DeviceNotFound(ctrl.device.clone()))?;

        device
            .push_state(State::new(reading.value), ctrl, &ctx.commands)
            .await?;

        tracing::debug!(rpm = reading.value, "Fan speed forwarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::controller::test_support::{context, drain, germination, reading};
    use crate::device::{DeviceKind, ExhaustFan};
    use crate::hardware::ExhaustFanSpec;
    use crate::telemetry::Control;

    fn pwm(pin: u16) -> Control {
        Control {
            pin,
            kind: "pwm".to_string(),
            device: "exhaust_fan".to_string(),
        }
    }

    fn fan_devices() -> HashMap<String, Arc<DeviceKind>> {
        let mut devices = HashMap::new();
        devices.insert(
            "exhaust_fan".to_string(),
            Arc::new(DeviceKind::ExhaustFan(ExhaustFan::new(ExhaustFanSpec {
                rpm_floor: 1000.0,
            }))),
        );
        devices
    }

    #[tokio::test]
    async fn below_floor_rpm_advances_the_calibration() {
        let controller = FanSpeedController::new();
        let (ctx, mut rx) = context(fan_devices(), Some(germination()));

        let r = reading("ef", 400.0, vec![pwm(9)]);
        controller.decide(&r, &ctx).await.unwrap();

        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(r#"{"command":"pwm","pin":9"#));
    }

    #[tokio::test]
    async fn passing_rpm_freezes_without_emitting() {
        let controller = FanSpeedController::new();
        let (ctx, mut rx) = context(fan_devices(), Some(germination()));

        let r = reading("ef", 1200.0, vec![pwm(9)]);
        controller.decide(&r, &ctx).await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn reading_without_controls_is_an_error() {
        let controller = FanSpeedController::new();
        let (ctx, _rx) = context(fan_devices(), Some(germination()));

        let r = reading("ef", 400.0, vec![]);
        assert!(controller.decide(&r, &ctx).await.is_err());
    }

    #[tokio::test]
    async fn unknown_device_is_an_error() {
        let controller = FanSpeedController::new();
        let (ctx, _rx) = context(HashMap::new(), Some(germination()));

        let r = reading("ef", 400.0, vec![pwm(9)]);
        let err = controller.decide(&r, &ctx).await.unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(_)));
    }
}
