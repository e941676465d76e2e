// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cultiva — closed-loop control for an automated growing environment.
//!
//! A microcontroller streams periodic sensor telemetry over a serial link
//! as newline-delimited JSON; this crate decides what the attached
//! actuators (fans, pumps, humidifier, alarms) should do and writes
//! actuation commands back over the same link.
//!
//! # Pipeline
//!
//! ```text
//! bytes ─▶ framer ─▶ reading ─▶ dispatcher ─▶ controller ─▶ device
//!                                                              │
//!       serial writer ◀── command loop ◀── outbound queue ◀────┘
//! ```
//!
//! - The [`telemetry`] framer reassembles readings from the byte stream
//!   and owns reconnection together with [`transport`].
//! - The [`dispatch`] layer fans readings out to [`controller`]s as
//!   detached tasks and serializes all outbound commands through one
//!   FIFO queue.
//! - [`controller`]s apply hysteresis (decision intervals, dead zones)
//!   and invoke [`device`]s, which turn intents into idempotent state
//!   transitions — including the exhaust fan's PWM threshold calibration
//!   and the water pump's runtime-estimated watering cycle.
//! - The [`phase`] resolver supplies day/night-aware target bands from
//!   the active growth phase.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cultiva::config::Settings;
//! use cultiva::controller::Context;
//! use cultiva::hardware::Hardware;
//! use cultiva::phase::{INITIAL_PHASE, PhaseResolver};
//! use cultiva::registry::Registry;
//! use cultiva::shutdown::Shutdown;
//! use cultiva::telemetry::TelemetryBus;
//! use cultiva::transport::SerialWriter;
//!
//! #[tokio::main]
//! async fn main() -> cultiva::Result<()> {
//!     let hardware = Hardware::default();
//!     let registry = Arc::new(Registry::standard(&hardware)?);
//!     let resolver = Arc::new(PhaseResolver::new());
//!     if let Some(phase) = registry.phase(INITIAL_PHASE) {
//!         resolver.switch(Arc::clone(phase));
//!     }
//!
//!     let (commands, queue) = tokio::sync::mpsc::channel(64);
//!     let ctx = Arc::new(Context {
//!         devices: registry.devices().clone(),
//!         resolver: Arc::clone(&resolver),
//!         hardware,
//!         commands,
//!         telemetry: TelemetryBus::new(),
//!     });
//!
//!     let writer = Arc::new(SerialWriter::new());
//!     let shutdown = Shutdown::new();
//!     tokio::spawn(cultiva::transport::run_link(
//!         Settings::from_env(),
//!         Arc::clone(&writer),
//!         Arc::clone(&registry),
//!         Arc::clone(&ctx),
//!         shutdown.clone(),
//!     ));
//!     cultiva::dispatch::command_loop(queue, writer, registry, resolver, shutdown).await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod controller;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod hardware;
pub mod phase;
pub mod registry;
pub mod shutdown;
pub mod telemetry;
pub mod transport;

pub use command::{CommandSender, CommandValue, DeviceCommand};
pub use config::Settings;
pub use controller::{Context, ControllerKind};
pub use device::{Action, DeviceKind, State};
pub use error::{Error, ParseError, PhaseError, Result, TransportError};
pub use hardware::Hardware;
pub use phase::{GrowthPhase, PhaseParam, PhaseResolver};
pub use registry::Registry;
pub use shutdown::Shutdown;
pub use telemetry::{Control, LineFramer, SensorReading, TelemetryBus};
pub use transport::SerialWriter;
