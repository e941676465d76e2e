// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware descriptions for the attached actuators and probes.
//!
//! These are immutable value structs constructed once at startup and passed
//! by reference. Devices and controllers read them; nothing mutates them
//! after construction.

/// Exhaust fan characteristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExhaustFanSpec {
    /// Minimum RPM at which the fan is considered to be actually turning.
    /// Below this the blades stall or judder; the calibration search looks
    /// for the lowest PWM step that clears it.
    pub rpm_floor: f64,
}

impl Default for ExhaustFanSpec {
    fn default() -> Self {
        Self { rpm_floor: 1000.0 }
    }
}

/// Soil moisture probe characteristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilProbeSpec {
    /// Raw ADC reading that corresponds to 100% volumetric moisture.
    pub upper_value: f64,
}

impl SoilProbeSpec {
    /// Converts a raw probe reading to a moisture percentage.
    #[must_use]
    pub fn to_percent(&self, raw: f64) -> f64 {
        raw / (self.upper_value / 100.0)
    }
}

impl Default for SoilProbeSpec {
    fn default() -> Self {
        Self { upper_value: 1023.0 }
    }
}

/// Water pump and pot characteristics for runtime estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpSpec {
    /// Pump flow rate in liters per second.
    pub flow_rate: f64,
    /// Effective wettable soil volume in liters.
    pub pot_volume: f64,
}

impl Default for PumpSpec {
    fn default() -> Self {
        Self {
            flow_rate: 2.5 / 60.0,
            pot_volume: 2.0,
        }
    }
}

/// The full hardware description for one growing chamber.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hardware {
    /// Exhaust fan on the PWM channel.
    pub exhaust_fan: ExhaustFanSpec,
    /// Capacitive soil moisture probe.
    pub soil_probe: SoilProbeSpec,
    /// Irrigation pump.
    pub pump: PumpSpec,
}
