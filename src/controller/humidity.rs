// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Relative humidity control.

use crate::device::Action;
use crate::error::Result;
use crate::phase::PhaseParam;
use crate::telemetry::SensorReading;

use super::Context;

/// Tolerance as a fraction of the floor-ceiling span.
const TOLERANCE_FRACTION: f64 = 0.20;

/// Keeps relative humidity inside the active phase's band.
///
/// Above the ceiling every control gets `Down` (the alarm and the
/// humidifier shut-off may both be addressed by one reading); between the
/// floor and `mid − tolerance` every control gets `Up`. Readings in the
/// upper half of the band, or below the floor, take no action — the dead
/// zone keeps the humidifier from cycling at the boundary.
///
/// Humidity reacts to every reading; the devices' idempotence absorbs the
/// sampling rate.
#[derive(Debug, Default)]
pub struct HumidityController;

impl HumidityController {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs one humidity decision.
    ///
    /// # Errors
    ///
    /// Returns an error if no phase is active or the queue is closed.
    pub async fn decide(&self, reading: &SensorReading, ctx: &Context) -> Result<()> {
        let phase = ctx.resolver.active()?;
        let now = ctx.time_of_day();
        let floor = phase.effective_at(PhaseParam::HumFloor, now);
        let ceil = phase.effective_at(PhaseParam::HumCeil, now);
        let mid = floor + (ceil - floor) / 2.0;
        let tolerance = (ceil - floor) * TOLERANCE_FRACTION;

        for ctrl in &reading.controls {
            let Some(device) = ctx.device(&ctrl.device) else {
                continue;
            };
            if reading.value > ceil {
                device.apply(Action::Down, ctrl, &ctx.commands).await?;
            } else if reading.value >= floor && reading.value <= mid - tolerance {
                device.apply(Action::Up, ctrl, &ctx.commands).await?;
            }
        }

        tracing::debug!(value = reading.value, floor, ceil, "Humidity decision");
        Ok(())
    }
}
