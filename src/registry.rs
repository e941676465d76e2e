// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The controller, device, and phase registries.
//!
//! All three maps are built once during initialization and are read-only
//! afterwards; lookups never mutate. Registration is explicit — the full
//! wiring between sensor ids, controllers, and devices is visible here.

use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::{
    ControllerKind, FanSpeedController, HumidityController, SmokeController,
    SoilMoistureController, TemperatureController,
};
use crate::device::{DeviceKind, ExhaustFan, LinearDevice, WaterPump};
use crate::error::Result;
use crate::hardware::Hardware;
use crate::phase::{GrowthPhase, standard_phases};

/// Startup-built lookup tables for the dispatch pipeline.
#[derive(Debug)]
pub struct Registry {
    controllers: HashMap<String, Arc<ControllerKind>>,
    devices: HashMap<String, Arc<DeviceKind>>,
    phases: HashMap<String, Arc<GrowthPhase>>,
}

impl Registry {
    /// Builds the standard registry for one growing chamber.
    ///
    /// Sensor ids: `dt` (temperature), `dh` (humidity), `sm` (soil
    /// moisture), `ef` (exhaust-fan RPM), `smoke`.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase catalog fails validation.
    pub fn standard(hardware: &Hardware) -> Result<Self> {
        let mut controllers = HashMap::new();
        controllers.insert(
            "dt".to_string(),
            Arc::new(ControllerKind::Temperature(TemperatureController::new())),
        );
        controllers.insert(
            "dh".to_string(),
            Arc::new(ControllerKind::Humidity(HumidityController::new())),
        );
        controllers.insert(
            "sm".to_string(),
            Arc::new(ControllerKind::SoilMoisture(SoilMoistureController::new())),
        );
        controllers.insert(
            "ef".to_string(),
            Arc::new(ControllerKind::FanSpeed(FanSpeedController::new())),
        );
        controllers.insert(
            "smoke".to_string(),
            Arc::new(ControllerKind::Smoke(SmokeController::new())),
        );

        let mut devices = HashMap::new();
        for id in [
            "alarm_light",
            "humidifier",
            "circulation_fan",
            "power_switch",
        ] {
            devices.insert(
                id.to_string(),
                Arc::new(DeviceKind::Linear(LinearDevice::new())),
            );
        }
        devices.insert(
            "water_pump".to_string(),
            Arc::new(DeviceKind::WaterPump(WaterPump::new(hardware.pump))),
        );
        devices.insert(
            "exhaust_fan".to_string(),
            Arc::new(DeviceKind::ExhaustFan(ExhaustFan::new(hardware.exhaust_fan))),
        );

        Ok(Self {
            controllers,
            devices,
            phases: standard_phases()?,
        })
    }

    /// Looks up the controller for a sensor id.
    #[must_use]
    pub fn controller(&self, sensor: &str) -> Option<&Arc<ControllerKind>> {
        self.controllers.get(sensor)
    }

    /// Looks up a device by id.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<&Arc<DeviceKind>> {
        self.devices.get(id)
    }

    /// The full device map, for building the controller context.
    #[must_use]
    pub fn devices(&self) -> &HashMap<String, Arc<DeviceKind>> {
        &self.devices
    }

    /// Looks up a growth phase by catalog name.
    #[must_use]
    pub fn phase(&self, name: &str) -> Option<&Arc<GrowthPhase>> {
        self.phases.get(name)
    }
}
