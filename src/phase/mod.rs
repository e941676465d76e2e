// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Growth phases: environmental target ranges with day/night resolution.
//!
//! A [`GrowthPhase`] is a named set of floor/ceiling bands (temperature,
//! humidity, soil moisture, soil pH), each optionally overridden at night.
//! Exactly one phase is active at a time; the [`PhaseResolver`] holds it
//! and answers `effective(param, now)` queries from controllers. Phases are
//! never mutated in place — a switch replaces the whole instance.

mod catalog;
mod resolver;

use chrono::{NaiveTime, Timelike};

use crate::error::PhaseError;

pub use catalog::{INITIAL_PHASE, standard_phases};
pub use resolver::PhaseResolver;

/// Hour at which the night window opens.
const NIGHT_START_HOUR: u32 = 22;

/// Hour at which the night window closes.
const NIGHT_END_HOUR: u32 = 6;

/// Returns true if `time` falls within the night window `[22:00, 06:00)`.
///
/// The window wraps around midnight.
#[must_use]
pub fn is_night(time: NaiveTime) -> bool {
    time.hour() >= NIGHT_START_HOUR || time.hour() < NIGHT_END_HOUR
}

/// One growth-phase parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseParam {
    /// Lower temperature bound (°C).
    TempFloor,
    /// Upper temperature bound (°C).
    TempCeil,
    /// Lower relative-humidity bound (%).
    HumFloor,
    /// Upper relative-humidity bound (%).
    HumCeil,
    /// Lower volumetric soil-moisture bound (%).
    SoilMoistureFloor,
    /// Upper volumetric soil-moisture bound (%).
    SoilMoistureCeil,
    /// Lower soil pH bound.
    SoilPhFloor,
    /// Upper soil pH bound.
    SoilPhCeil,
}

impl std::fmt::Display for PhaseParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TempFloor => "TEMP_FLOOR",
            Self::TempCeil => "TEMP_CEIL",
            Self::HumFloor => "HUM_FLOOR",
            Self::HumCeil => "HUM_CEIL",
            Self::SoilMoistureFloor => "SOIL_MOISTURE_FLOOR",
            Self::SoilMoistureCeil => "SOIL_MOISTURE_CEIL",
            Self::SoilPhFloor => "SOIL_PH_FLOOR",
            Self::SoilPhCeil => "SOIL_PH_CEIL",
        };
        f.write_str(name)
    }
}

/// A validated floor/ceiling pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    floor: f64,
    ceil: f64,
}

impl Band {
    /// Creates a band, enforcing `floor <= ceil`.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::InvalidBand`] if the bounds are inverted.
    pub fn new(param: &str, floor: f64, ceil: f64) -> Result<Self, PhaseError> {
        if floor > ceil {
            return Err(PhaseError::InvalidBand {
                param: param.to_string(),
                floor,
                ceil,
            });
        }
        Ok(Self { floor, ceil })
    }

    /// Lower bound.
    #[must_use]
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Upper bound.
    #[must_use]
    pub fn ceil(&self) -> f64 {
        self.ceil
    }

    /// Width of the band.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.ceil - self.floor
    }

    /// Midpoint of the band.
    #[must_use]
    pub fn mid(&self) -> f64 {
        self.floor + self.span() / 2.0
    }
}

/// Nullable night-time overrides, one slot per [`PhaseParam`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NightOverrides {
    /// Night override for `TEMP_FLOOR`.
    pub temp_floor: Option<f64>,
    /// Night override for `TEMP_CEIL`.
    pub temp_ceil: Option<f64>,
    /// Night override for `HUM_FLOOR`.
    pub hum_floor: Option<f64>,
    /// Night override for `HUM_CEIL`.
    pub hum_ceil: Option<f64>,
    /// Night override for `SOIL_MOISTURE_FLOOR`.
    pub soil_moisture_floor: Option<f64>,
    /// Night override for `SOIL_MOISTURE_CEIL`.
    pub soil_moisture_ceil: Option<f64>,
    /// Night override for `SOIL_PH_FLOOR`.
    pub soil_ph_floor: Option<f64>,
    /// Night override for `SOIL_PH_CEIL`.
    pub soil_ph_ceil: Option<f64>,
}

impl NightOverrides {
    fn get(&self, param: PhaseParam) -> Option<f64> {
        match param {
            PhaseParam::TempFloor => self.temp_floor,
            PhaseParam::TempCeil => self.temp_ceil,
            PhaseParam::HumFloor => self.hum_floor,
            PhaseParam::HumCeil => self.hum_ceil,
            PhaseParam::SoilMoistureFloor => self.soil_moisture_floor,
            PhaseParam::SoilMoistureCeil => self.soil_moisture_ceil,
            PhaseParam::SoilPhFloor => self.soil_ph_floor,
            PhaseParam::SoilPhCeil => self.soil_ph_ceil,
        }
    }

    fn validate(&self) -> Result<(), PhaseError> {
        let pairs = [
            ("NIGHT_TEMP", self.temp_floor, self.temp_ceil),
            ("NIGHT_HUM", self.hum_floor, self.hum_ceil),
            (
                "NIGHT_SOIL_MOISTURE",
                self.soil_moisture_floor,
                self.soil_moisture_ceil,
            ),
            ("NIGHT_SOIL_PH", self.soil_ph_floor, self.soil_ph_ceil),
        ];
        for (param, floor, ceil) in pairs {
            if let (Some(floor), Some(ceil)) = (floor, ceil) {
                // A half-set pair combines with the day value at resolution
                // time, so only fully-set pairs can be checked here.
                Band::new(param, floor, ceil)?;
            }
        }
        Ok(())
    }
}

/// A named set of environmental target ranges.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use cultiva::phase::{Band, GrowthPhase, PhaseParam};
///
/// let phase = GrowthPhase::new(
///     "Germination",
///     Band::new("TEMP", 24.0, 30.0).unwrap(),
///     Band::new("HUM", 70.0, 80.0).unwrap(),
///     Band::new("SOIL_MOISTURE", 35.0, 45.0).unwrap(),
///     Band::new("SOIL_PH", 6.0, 6.8).unwrap(),
/// );
///
/// let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
/// assert!((phase.effective_at(PhaseParam::HumCeil, noon) - 80.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPhase {
    name: String,
    temperature: Band,
    humidity: Band,
    soil_moisture: Band,
    soil_ph: Band,
    night: NightOverrides,
}

impl GrowthPhase {
    /// Creates a phase with no night overrides.
    #[must_use]
    pub fn new(
        name: &str,
        temperature: Band,
        humidity: Band,
        soil_moisture: Band,
        soil_ph: Band,
    ) -> Self {
        Self {
            name: name.to_string(),
            temperature,
            humidity,
            soil_moisture,
            soil_ph,
            night: NightOverrides::default(),
        }
    }

    /// Attaches night overrides.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::InvalidBand`] if a fully-set override pair is
    /// inverted.
    pub fn with_night(mut self, night: NightOverrides) -> Result<Self, PhaseError> {
        night.validate()?;
        self.night = night;
        Ok(self)
    }

    /// Phase name as registered in the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The day value of a parameter.
    #[must_use]
    pub fn day(&self, param: PhaseParam) -> f64 {
        match param {
            PhaseParam::TempFloor => self.temperature.floor,
            PhaseParam::TempCeil => self.temperature.ceil,
            PhaseParam::HumFloor => self.humidity.floor,
            PhaseParam::HumCeil => self.humidity.ceil,
            PhaseParam::SoilMoistureFloor => self.soil_moisture.floor,
            PhaseParam::SoilMoistureCeil => self.soil_moisture.ceil,
            PhaseParam::SoilPhFloor => self.soil_ph.floor,
            PhaseParam::SoilPhCeil => self.soil_ph.ceil,
        }
    }

    /// The value effective at `time`: the night override when `time` falls
    /// in the night window and the override is set, else the day value.
    #[must_use]
    pub fn effective_at(&self, param: PhaseParam, time: NaiveTime) -> f64 {
        if is_night(time) {
            if let Some(value) = self.night.get(param) {
                return value;
            }
        }
        self.day(param)
    }
}
