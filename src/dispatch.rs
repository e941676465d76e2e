// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The dispatcher: sensor fan-out and the serialized command loop.
//!
//! Two independent responsibilities meet at the outbound queue:
//!
//! - [`dispatch_reading`] routes each inbound reading to its controller as
//!   a detached task. No handle is retained and there is no backpressure;
//!   two readings for the same sensor arriving faster than the controller
//!   can process them run concurrently, and controllers defend against
//!   that internally. This at-most-effectively-once, unordered policy is
//!   intentional.
//! - [`command_loop`] is the queue's single consumer. Whatever order
//!   producers enqueued in is the order commands reach the wire.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::command::{QueueEntry, classify};
use crate::controller::Context;
use crate::phase::PhaseResolver;
use crate::registry::Registry;
use crate::shutdown::Shutdown;
use crate::telemetry::SensorReading;
use crate::transport::SerialWriter;

/// Routes one inbound reading to its controller, fire-and-forget.
///
/// The reading is first offered to the telemetry bus (which never blocks
/// or fails), then handed to the controller registered for its sensor id
/// as a detached task. Readings for unregistered sensors are logged and
/// dropped.
pub fn dispatch_reading(reading: SensorReading, registry: &Arc<Registry>, ctx: &Arc<Context>) {
    ctx.telemetry.publish(reading.clone());

    match registry.controller(&reading.sensor) {
        Some(controller) => {
            let controller = Arc::clone(controller);
            let ctx = Arc::clone(ctx);
            tokio::spawn(async move {
                controller.handle(reading, &ctx).await;
            });
        }
        None => {
            tracing::warn!(sensor = %reading.sensor, "No controller for sensor; dropping reading");
        }
    }
}

/// Consumes the outbound queue in strict FIFO order until shutdown.
///
/// Phase switches and shutdown requests are consumed here; every other
/// entry is forwarded to the serial writer verbatim. Malformed entries
/// are logged and dropped. A write failure loses that command only — the
/// loop keeps going.
pub async fn command_loop(
    mut queue: mpsc::Receiver<String>,
    writer: Arc<SerialWriter>,
    registry: Arc<Registry>,
    resolver: Arc<PhaseResolver>,
    shutdown: Shutdown,
) {
    while let Some(entry) = queue.recv().await {
        match classify(&entry) {
            Ok(QueueEntry::PhaseSwitch(name)) => match registry.phase(&name) {
                Some(phase) => resolver.switch(Arc::clone(phase)),
                None => {
                    tracing::warn!(phase = %name, "Unknown growth phase; switch ignored");
                }
            },
            Ok(QueueEntry::Shutdown) => {
                shutdown.request();
                break;
            }
            Ok(QueueEntry::Forward) => {
                if let Err(e) = writer.send(&entry).await {
                    tracing::warn!(command = %entry, error = %e,
                        "Serial write failed; command lost");
                }
            }
            Err(e) => {
                tracing::warn!(entry = %entry, error = %e, "Dropping malformed command");
            }
        }
    }

    tracing::info!("Command loop stopped");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::command::{phase_command, shutdown_command};
    use crate::hardware::Hardware;
    use crate::telemetry::TelemetryBus;

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::standard(&Hardware::default()).unwrap())
    }

    fn context(commands: crate::command::CommandSender) -> Arc<Context> {
        Arc::new(Context {
            devices: HashMap::new(),
            resolver: Arc::new(PhaseResolver::new()),
            hardware: Hardware::default(),
            commands,
            telemetry: TelemetryBus::new(),
        })
    }

    fn reading(sensor: &str) -> SensorReading {
        SensorReading {
            sensor: sensor.to_string(),
            label: String::new(),
            value: 0.0,
            unit: String::new(),
            controls: vec![],
        }
    }

    #[tokio::test]
    async fn unknown_sensor_is_dropped_quietly() {
        let (tx, mut rx) = mpsc::channel(8);
        let ctx = context(tx);

        dispatch_reading(reading("bogus"), &registry(), &ctx);
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_routable_reading_reaches_the_bus() {
        let (tx, _rx) = mpsc::channel(8);
        let ctx = context(tx);
        let mut bus_rx = ctx.telemetry.subscribe();

        dispatch_reading(reading("dt"), &registry(), &ctx);
        // Even unroutable readings are offered to the bus first.
        dispatch_reading(reading("bogus"), &registry(), &ctx);

        assert_eq!(bus_rx.recv().await.unwrap().sensor, "dt");
        assert_eq!(bus_rx.recv().await.unwrap().sensor, "bogus");
    }

    #[tokio::test]
    async fn phase_switch_entry_swaps_the_active_phase() {
        let (tx, rx) = mpsc::channel(8);
        let resolver = Arc::new(PhaseResolver::new());
        let shutdown = Shutdown::new();

        tx.send(phase_command("Flowering")).await.unwrap();
        tx.send(shutdown_command()).await.unwrap();
        drop(tx);

        command_loop(
            rx,
            Arc::new(SerialWriter::new()),
            registry(),
            Arc::clone(&resolver),
            shutdown.clone(),
        )
        .await;

        assert_eq!(resolver.active_name().as_deref(), Some("Flowering"));
        assert!(shutdown.is_requested());
    }

    #[tokio::test]
    async fn unknown_phase_is_ignored() {
        let (tx, rx) = mpsc::channel(8);
        let resolver = Arc::new(PhaseResolver::new());

        tx.send(phase_command("Ripening")).await.unwrap();
        tx.send(shutdown_command()).await.unwrap();
        drop(tx);

        command_loop(
            rx,
            Arc::new(SerialWriter::new()),
            registry(),
            Arc::clone(&resolver),
            Shutdown::new(),
        )
        .await;

        assert!(resolver.active_name().is_none());
    }

    #[tokio::test]
    async fn malformed_entries_do_not_stop_the_loop() {
        let (tx, rx) = mpsc::channel(8);
        let resolver = Arc::new(PhaseResolver::new());

        tx.send("{not json".to_string()).await.unwrap();
        tx.send(phase_command("Seedling")).await.unwrap();
        tx.send(shutdown_command()).await.unwrap();
        drop(tx);

        command_loop(
            rx,
            Arc::new(SerialWriter::new()),
            registry(),
            Arc::clone(&resolver),
            Shutdown::new(),
        )
        .await;

        assert_eq!(resolver.active_name().as_deref(), Some("Seedling"));
    }

    #[tokio::test]
    async fn loop_exits_on_shutdown_entry() {
        let (tx, rx) = mpsc::channel(8);

        tx.send(shutdown_command()).await.unwrap();
        // Never consumed: the loop stops at the shutdown entry.
        tx.send(phase_command("Flowering")).await.unwrap();

        let resolver = Arc::new(PhaseResolver::new());
        command_loop(
            rx,
            Arc::new(SerialWriter::new()),
            registry(),
            Arc::clone(&resolver),
            Shutdown::new(),
        )
        .await;

        assert!(resolver.active_name().is_none());
    }
}
