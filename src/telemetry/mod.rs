// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound telemetry: wire shapes, line framing, and the ingestion bus.

mod bus;
mod framer;
mod reading;

pub use bus::TelemetryBus;
pub use framer::LineFramer;
pub use reading::{Control, SensorReading, parse_reading};
