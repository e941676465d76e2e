// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Air temperature control.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::device::Action;
use crate::error::Result;
use crate::phase::PhaseParam;
use crate::telemetry::SensorReading;

use super::Context;

/// Minimum time between effective decisions. Air temperature does not
/// change abruptly; reacting to every reading would chatter the actuators.
const DECISION_INTERVAL: Duration = Duration::from_secs(60);

/// Dead-zone half-width as a fraction of the floor-ceiling span.
const TOLERANCE_FRACTION: f64 = 0.15;

/// Keeps the chamber temperature near the middle of the active phase's
/// band.
///
/// Above `mid + tolerance` every control in the reading gets `Down`
/// (cool: speed the exhaust fan up, cut heating); below `mid − tolerance`
/// it gets `Up`. Inside the dead zone nothing happens.
#[derive(Debug, Default)]
pub struct TemperatureController {
    last_decision: Mutex<Option<Instant>>,
}

impl TemperatureController {
    /// Creates a controller that has made no decision yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one temperature decision.
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
        let floor = phase.effective_at(PhaseParam::TempFloor, now);
        let ceil = phase.effective_at(PhaseParam::TempCeil, now);
        let mid = floor + (ceil - floor) / 2.0;
        let tolerance = (ceil - floor) * TOLERANCE_FRACTION;

        for ctrl in &reading.controls {
            let Some(device) = ctx.device(&ctrl.device) else {
                continue;
            };
            if reading.value > mid + tolerance {
                device.apply(Action::Down, ctrl, &ctx.commands).await?;
            } else if reading.value < mid - tolerance {
                device.apply(Action::Up, ctrl, &ctx.commands).await?;
            }
        }

        *last = Some(Instant::now());
        tracing::debug!(value = reading.value, mid, tolerance, "Temperature decision");
        Ok(())
    }
}
