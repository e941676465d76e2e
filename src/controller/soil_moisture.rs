// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Soil moisture control and the watering cycle.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::device::Action;
use crate::error::Result;
use crate::phase::PhaseParam;
use crate::telemetry::SensorReading;

use super::Context;

/// Minimum time between effective decisions. Soil moisture changes
/// slowly, and a watering cycle must finish before the next reading can
/// trigger another one.
const DECISION_INTERVAL: Duration = Duration::from_secs(60);

/// Tolerance as a fraction of the floor-ceiling span.
const TOLERANCE_FRACTION: f64 = 0.20;

/// Waters the pot when soil moisture drops to the band floor.
///
/// The raw probe reading is normalized to a percentage via the probe's
/// upper calibration value. At or below `floor + tolerance`, each control
/// gets `Up`; when the target device has a runtime model (the water pump),
/// the controller holds its lock, sleeps for the estimated runtime, and
/// issues the `Down` itself — the only timed actuation cycle in the
/// pipeline. Holding the lock across the sleep means a watering in
/// progress also suppresses any concurrent or queued soil decision.
#[derive(Debug, Default)]
pub struct SoilMoistureController {
    last_decision: Mutex<Option<Instant>>,
}

impl SoilMoistureController {
    /// Creates a controller that has made no decision yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one soil-moisture decision, including the watering cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if no phase is active or the queue is closed.
    pub async fn decide(&self, reading: &SensorReading, ctx: &Context) -> Result<()> {
        let mut last = self.last_decision.lock().await;
        if let Some(at) = *last {
            if at.elapsed() < DECISION_INTERVAL {
                return Ok(());
            }
        }

        let phase = ctx.resolver.active()?;
        let now = ctx.time_of_day();
        let floor = phase.effective_at(PhaseParam::SoilMoistureFloor, now);
        let ceil = phase.effective_at(PhaseParam::SoilMoistureCeil, now);
        let tolerance = (ceil - floor) * TOLERANCE_FRACTION;

        let percent = ctx.hardware.soil_probe.to_percent(reading.value);

        for ctrl in &reading.controls {
            let Some(device) = ctx.device(&ctrl.device) else {
                continue;
            };
            if percent <= floor + tolerance {
                let runtime = device.estimate_runtime(percent, ceil);

                device.apply(Action::Up, ctrl, &ctx.commands).await?;

                if let Some(secs) = runtime {
                    tracing::info!(seconds = secs, "Watering");
                    tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))).await;
                    device.apply(Action::Down, ctrl, &ctx.commands).await?;
                }
            }
        }

        *last = Some(Instant::now());
        tracing::debug!(raw = reading.value, percent, floor, "Soil moisture decision");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::controller::test_support::{context, digital, drain, germination, reading};
    use crate::device::{DeviceKind, LinearDevice, WaterPump};
    use crate::hardware::PumpSpec;

    fn pump_devices() -> HashMap<String, Arc<DeviceKind>> {
        let mut devices = HashMap::new();
        devices.insert(
            "water_pump".to_string(),
            Arc::new(DeviceKind::WaterPump(WaterPump::new(PumpSpec::default()))),
        );
        devices
    }

    // Germination soil band is 35-45: trigger at or below 37%.
    // Probe upper value 1023, so 1% of raw scale is 10.23.

    #[tokio::test(start_paused = true)]
    async fn dry_soil_runs_a_full_watering_cycle() {
        let controller = SoilMoistureController::new();
        let (ctx, mut rx) = context(pump_devices(), Some(germination()));

        // Raw 310 is about 30.3% — well below the trigger line.
        let r = reading("sm", 310.0, vec![digital(7, "water_pump")]);
        controller.decide(&r, &ctx).await.unwrap();

        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(r#""value":1}"#));
        assert!(lines[1].ends_with(r#""value":0}"#));
    }

    #[tokio::test]
    async fn moist_soil_takes_no_action() {
        let controller = SoilMoistureController::new();
        let (ctx, mut rx) = context(pump_devices(), Some(germination()));

        // Raw 450 is about 44% — inside the band.
        let r = reading("sm", 450.0, vec![digital(7, "water_pump")]);
        controller.decide(&r, &ctx).await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn second_decision_within_interval_is_suppressed() {
        let controller = SoilMoistureController::new();
        let (ctx, mut rx) = context(pump_devices(), Some(germination()));

        let r = reading("sm", 310.0, vec![digital(7, "water_pump")]);
        controller.decide(&r, &ctx).await.unwrap();
        let first = drain(&mut rx).len();

        controller.decide(&r, &ctx).await.unwrap();
        let second = drain(&mut rx).len();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn device_without_estimator_only_switches_on() {
        let controller = SoilMoistureController::new();
        let mut devices = HashMap::new();
        devices.insert(
            "generic_pump".to_string(),
            Arc::new(DeviceKind::Linear(LinearDevice::new())),
        );
        let (ctx, mut rx) = context(devices, Some(germination()));

        let r = reading("sm", 310.0, vec![digital(7, "generic_pump")]);
        controller.decide(&r, &ctx).await.unwrap();

        let lines = drain(&mut rx);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(r#""value":1}"#));
    }

    #[tokio::test]
    async fn missing_phase_is_an_error() {
        let controller = SoilMoistureController::new();
        let (ctx, _rx) = context(pump_devices(), None);

        let r = reading("sm", 310.0, vec![digital(7, "water_pump")]);
        assert!(controller.decide(&r, &ctx).await.is_err());
    }
}
