// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decision units converting sensor readings into actuation intents.
//!
//! A controller receives one [`SensorReading`] and invokes zero or more
//! devices. Controllers are invoked as detached concurrent tasks with no
//! ordering guarantee — two readings for the same sensor can run at once —
//! so stateful controllers collapse bursts with their own lock plus a
//! decision-interval check, and a dead zone around the target keeps
//! actuators from chattering at band edges.
//!
//! A controller never lets an error escape: whatever goes wrong inside a
//! decision is logged and treated as "no action taken" for that invocation.

mod fan_speed;
mod humidity;
mod smoke;
mod soil_moisture;
mod temperature;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveTime;

use crate::command::CommandSender;
use crate::device::DeviceKind;
use crate::error::Result;
use crate::hardware::Hardware;
use crate::phase::PhaseResolver;
use crate::telemetry::{SensorReading, TelemetryBus};

pub use fan_speed::FanSpeedController;
pub use humidity::HumidityController;
pub use smoke::SmokeController;
pub use soil_moisture::SoilMoistureController;
pub use temperature::TemperatureController;

/// Shared environment handed to every controller invocation.
#[derive(Debug)]
pub struct Context {
    /// Registered devices, keyed by device id. Built once at startup.
    pub devices: HashMap<String, Arc<DeviceKind>>,
    /// The active-phase resolver.
    pub resolver: Arc<PhaseResolver>,
    /// Hardware description for normalization and estimation.
    pub hardware: Hardware,
    /// Outbound command queue.
    pub commands: CommandSender,
    /// Ingestion hook for external telemetry sinks.
    pub telemetry: TelemetryBus,
}

impl Context {
    /// Looks up a device, logging the miss.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<&Arc<DeviceKind>> {
        let found = self.devices.get(id);
        if found.is_none() {
            tracing::warn!(device = %id, "No device registered; skipping control");
        }
        found
    }

    /// Current local wall-clock time of day.
    #[must_use]
    pub fn time_of_day(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// A registered controller.
///
/// One variant per sensor family; dispatch is an explicit match rather
/// than dynamic lookup, so the full set is visible in one place.
#[derive(Debug)]
pub enum ControllerKind {
    /// Air temperature (`dt`).
    Temperature(TemperatureController),
    /// Relative humidity (`dh`).
    Humidity(HumidityController),
    /// Volumetric soil moisture (`sm`).
    SoilMoisture(SoilMoistureController),
    /// Exhaust-fan RPM feedback (`ef`).
    FanSpeed(FanSpeedController),
    /// Smoke detection (`smoke`).
    Smoke(SmokeController),
}

impl ControllerKind {
    /// Runs one decision, swallowing any internal error.
    ///
    /// This is the boundary the dispatcher relies on: no matter what goes
    /// wrong inside, the invocation ends quietly with the failure logged.
    pub async fn handle(&self, reading: SensorReading, ctx: &Context) {
        if let Err(e) = self.decide(&reading, ctx).await {
            tracing::warn!(sensor = %reading.sensor, error = %e,
                "Controller error; no action taken");
        }
    }

    async fn decide(&self, reading: &SensorReading, ctx: &Context) -> Result<()> {
        match self {
            Self::Temperature(c) => c.decide(reading, ctx).await,
            Self::Humidity(c) => c.decide(reading, ctx).await,
            Self::SoilMoisture(c) => c.decide(reading, ctx).await,
            Self::FanSpeed(c) => c.decide(reading, ctx).await,
            Self::Smoke(c) => c.decide(reading, ctx).await,
        }
    }
}
