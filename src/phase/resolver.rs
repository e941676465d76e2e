// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The active-phase slot and day/night parameter resolution.

use std::sync::Arc;

use chrono::NaiveTime;
use parking_lot::RwLock;

use crate::error::PhaseError;

use super::{GrowthPhase, PhaseParam};

/// Holds the single active [`GrowthPhase`] and resolves parameters against
/// the day/night rule.
///
/// Controllers snapshot the active phase once per decision so that a
/// concurrent switch cannot tear a floor/ceiling pair. A switch replaces
/// the whole phase atomically; the old instance stays valid for decisions
/// already holding it.
///
/// Accessing any parameter before a phase has been set is an error.
#[derive(Debug, Default)]
pub struct PhaseResolver {
    active: RwLock<Option<Arc<GrowthPhase>>>,
}

impl PhaseResolver {
    /// Creates a resolver with no active phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the active phase.
    pub fn switch(&self, phase: Arc<GrowthPhase>) {
        tracing::info!(phase = %phase.name(), "Switching growth phase");
        *self.active.write() = Some(phase);
    }

    /// Returns the active phase.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotSet`] before the first switch.
    pub fn active(&self) -> Result<Arc<GrowthPhase>, PhaseError> {
        self.active.read().clone().ok_or(PhaseError::NotSet)
    }

    /// Name of the active phase, if any.
    #[must_use]
    pub fn active_name(&self) -> Option<String> {
        self.active
            .read()
            .as_ref()
            .map(|p| p.name().to_string())
    }

    /// Resolves a parameter at the given time of day.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotSet`] before the first switch.
    pub fn effective_at(&self, param: PhaseParam, time: NaiveTime) -> Result<f64, PhaseError> {
        Ok(self.active()?.effective_at(param, time))
    }

    /// Resolves a parameter at the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotSet`] before the first switch.
    pub fn effective(&self, param: PhaseParam) -> Result<f64, PhaseError> {
        self.effective_at(param, chrono::Local::now().time())
    }
}
