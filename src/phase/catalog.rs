// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The built-in growth-phase catalog.
//!
//! Plain data: the target ranges for each stage of the grow cycle. The
//! first entry, Germination, is the phase activated at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::PhaseError;

use super::{Band, GrowthPhase};

/// Name of the phase activated at startup.
pub const INITIAL_PHASE: &str = "Germination";

fn phase(
    name: &str,
    temp: (f64, f64),
    hum: (f64, f64),
    soil_moisture: (f64, f64),
    soil_ph: (f64, f64),
) -> Result<GrowthPhase, PhaseError> {
    Ok(GrowthPhase::new(
        name,
        Band::new("TEMP", temp.0, temp.1)?,
        Band::new("HUM", hum.0, hum.1)?,
        Band::new("SOIL_MOISTURE", soil_moisture.0, soil_moisture.1)?,
        Band::new("SOIL_PH", soil_ph.0, soil_ph.1)?,
    ))
}

/// Builds the standard catalog, keyed by phase name.
///
/// # Errors
///
/// Returns [`PhaseError::InvalidBand`] if a table entry is inverted.
pub fn standard_phases() -> Result<HashMap<String, Arc<GrowthPhase>>, PhaseError> {
    let phases = [
        phase(
            "Germination",
            (24.0, 30.0),
            (70.0, 80.0),
            (35.0, 45.0),
            (6.0, 6.8),
        )?,
        phase(
            "Seedling",
            (22.0, 28.0),
            (65.0, 75.0),
            (30.0, 40.0),
            (6.0, 6.8),
        )?,
        phase(
            "Vegetative",
            (22.0, 28.0),
            (60.0, 70.0),
            (25.0, 35.0),
            (6.0, 7.0),
        )?,
        phase(
            "Flowering",
            (22.0, 26.0),
            (50.0, 60.0),
            (25.0, 30.0),
            (6.0, 7.0),
        )?,
        phase(
            "LateGrowth",
            (22.0, 26.0),
            (45.0, 60.0),
            (20.0, 30.0),
            (6.0, 7.0),
        )?,
    ];

    Ok(phases
        .into_iter()
        .map(|p| (p.name().to_string(), Arc::new(p)))
        .collect())
}
