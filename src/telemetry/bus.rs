// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus offering readings to external ingestion sinks.

use tokio::sync::broadcast;

use super::reading::SensorReading;

/// Default channel capacity for the telemetry bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out channel for inbound sensor readings.
///
/// The dispatcher offers every routable reading to this bus before (and
/// independently of) control decisions. Subscribers are external
/// collaborators — a time-series exporter, a UI, a recorder. Publishing
/// never fails and never blocks: with no subscribers the reading is
/// discarded, and a slow subscriber loses old readings rather than
/// stalling dispatch.
///
/// # Examples
///
/// ```
/// use cultiva::telemetry::{SensorReading, TelemetryBus};
///
/// let bus = TelemetryBus::new();
/// let _exporter = bus.subscribe();
///
/// bus.publish(SensorReading {
///     sensor: "dt".into(),
///     label: "Temperature".into(),
///     value: 25.0,
///     unit: "C".into(),
///     controls: vec![],
/// });
/// ```
#[derive(Debug)]
pub struct TelemetryBus {
    sender: broadcast::Sender<SensorReading>,
}

impl TelemetryBus {
    /// Creates a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` readings per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to readings published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SensorReading> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Offers a reading to all subscribers. Never fails or blocks.
    pub fn publish(&self, reading: SensorReading) {
        let _ = self.sender.send(reading);
    }
}

impl Default for TelemetryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TelemetryBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
