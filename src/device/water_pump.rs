// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Irrigation pump with volumetric runtime estimation.
//!
//! Runtime model:
//!
//! ```text
//! T = ((M_target − M_current) / 100) × (V_pot / Q_pump)
//! ```
//!
//! where `T` is the run time in seconds, `M_*` are volumetric soil
//! moisture percentages, `V_pot` is the wettable volume in liters and
//! `Q_pump` the flow rate in liters per second.

use crate::command::CommandSender;
use crate::error::Result;
use crate::hardware::PumpSpec;
use crate::telemetry::Control;

use super::{Action, LinearDevice};

/// The irrigation pump.
///
/// Switching is plain linear on/off; on `Up` the pump turns on immediately
/// and the *controller* is responsible for sleeping for the estimated
/// runtime and issuing the `Down` afterwards.
#[derive(Debug)]
pub struct WaterPump {
    switch: LinearDevice,
    spec: PumpSpec,
}

impl WaterPump {
    /// Creates a pump in the off state.
    #[must_use]
    pub fn new(spec: PumpSpec) -> Self {
        Self {
            switch: LinearDevice::new(),
            spec,
        }
    }

    /// Drives the pump relay like any linear device.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::QueueClosed`] if the outbound queue
    /// is gone.
    pub async fn apply(
        &self,
        action: Action,
        ctrl: &Control,
        commands: &CommandSender,
    ) -> Result<()> {
        self.switch.apply(action, ctrl, commands).await
    }

    /// Seconds the pump must run to raise moisture from `current` to
    /// `target` percent. Never negative: an already-wet pot estimates 0.
    #[must_use]
    pub fn estimate_runtime(&self, current: f64, target: f64) -> f64 {
        let delta = (target - current).max(0.0);
        (delta / 100.0) * (self.spec.pot_volume / self.spec.flow_rate)
    }
}
