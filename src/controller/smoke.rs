// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smoke shut-off.

use crate::device::Action;
use crate::error::Result;
use crate::telemetry::SensorReading;

use super::Context;

/// Shuts every addressed device down on any smoke reading.
///
/// No decision interval and no dead zone: smoke must act immediately, on
/// every sample, and the linear devices' idempotence makes the repeats
/// free.
#[derive(Debug, Default)]
pub struct SmokeController;

impl SmokeController {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Drives every control in the reading to its off state.
    ///
    /// # Errors
    ///
    /// Returns an error only if the outbound queue is closed.
    pub async fn decide(&self, reading: &SensorReading, ctx: &Context) -> Result<()> {
        tracing::warn!(value = reading.value, "Smoke detected; shutting devices off");

        for ctrl in &reading.controls {
            let Some(device) = ctx.device(&ctrl.device) else {
                continue;
            };
            device.apply(Action::Down, ctrl, &ctx.commands).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::controller::test_support::{context, digital, drain, reading};
    use crate::device::{DeviceKind, LinearDevice};

    async fn running_devices() -> HashMap<String, Arc<DeviceKind>> {
        let mut devices: HashMap<String, Arc<DeviceKind>> = HashMap::new();
        for id in ["power_switch", "circulation_fan"] {
            let device = LinearDevice::new();
            // Pre-drive the device on so the shut-off is observable.
            let (tx, _rx) = tokio::sync::mpsc::channel(4);
            device
                .apply(Action::Up, &digital(1, id), &tx)
                .await
                .unwrap();
            devices.insert(id.to_string(), Arc::new(DeviceKind::Linear(device)));
        }
        devices
    }

    #[tokio::test]
    async fn smoke_shuts_every_control_down() {
        let controller = SmokeController::new();
        let (ctx, mut rx) = context(running_devices().await, None);

        let r = reading(
            "smoke",
            1.0,
            vec![digital(2, "power_switch"), digital(3, "circulation_fan")],
        );
        controller.decide(&r, &ctx).await.unwrap();

        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.ends_with(r#""value":0}"#)));
    }

    #[tokio::test]
    async fn works_without_an_active_phase() {
        // Smoke consults no phase parameters; it must act even before the
        // first phase switch.
        let controller = SmokeController::new();
        let (ctx, _rx) = context(HashMap::new(), None);

        let r = reading("smoke", 1.0, vec![digital(2, "power_switch")]);
        assert!(controller.decide(&r, &ctx).await.is_ok());
    }

    #[tokio::test]
    async fn repeat_readings_are_idempotent() {
        let controller = SmokeController::new();
        let (ctx, mut rx) = context(running_devices().await, None);

        let r = reading("smoke", 1.0, vec![digital(2, "power_switch")]);
        controller.decide(&r, &ctx).await.unwrap();
        controller.decide(&r, &ctx).await.unwrap();

        // One transition, one command.
        assert_eq!(drain(&mut rx).len(), 1);
    }
}
