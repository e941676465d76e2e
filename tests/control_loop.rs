// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline tests: framed bytes in, wire commands out.
//!
//! The serial port is replaced by an in-memory sink; everything between
//! the framer and the writer is the real production path.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use cultiva::command::phase_command;
use cultiva::config::Settings;
use cultiva::controller::Context;
use cultiva::dispatch::{command_loop, dispatch_reading};
use cultiva::hardware::Hardware;
use cultiva::phase::{INITIAL_PHASE, PhaseResolver};
use cultiva::registry::Registry;
use cultiva::shutdown::Shutdown;
use cultiva::telemetry::{LineFramer, TelemetryBus};
use cultiva::transport::SerialWriter;

/// In-memory stand-in for the serial port's write half.
#[derive(Clone, Default)]
struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CaptureSink {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

struct Harness {
    registry: Arc<Registry>,
    resolver: Arc<PhaseResolver>,
    ctx: Arc<Context>,
    commands: mpsc::Sender<String>,
    sink: CaptureSink,
    shutdown: Shutdown,
    loop_handle: tokio::task::JoinHandle<()>,
}

async fn start() -> Harness {
    let hardware = Hardware::default();
    let registry = Arc::new(Registry::standard(&hardware).unwrap());
    let resolver = Arc::new(PhaseResolver::new());
    resolver.switch(Arc::clone(registry.phase(INITIAL_PHASE).unwrap()));

    let (commands, queue) = mpsc::channel(64);
    let ctx = Arc::new(Context {
        devices: registry.devices().clone(),
        resolver: Arc::clone(&resolver),
        hardware,
        commands: commands.clone(),
        telemetry: TelemetryBus::new(),
    });

    let sink = CaptureSink::default();
    let writer = Arc::new(SerialWriter::new());
    writer.attach(Box::new(sink.clone())).await;

    let shutdown = Shutdown::new();
    let loop_handle = tokio::spawn(command_loop(
        queue,
        writer,
        Arc::clone(&registry),
        Arc::clone(&resolver),
        shutdown.clone(),
    ));

    Harness {
        registry,
        resolver,
        ctx,
        commands,
        sink,
        shutdown,
        loop_handle,
    }
}

async fn wait_for_lines(sink: &CaptureSink, count: usize) -> Vec<String> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let lines = sink.lines();
            if lines.len() >= count {
                return lines;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("expected wire output did not arrive")
}

fn humidity_line(value: f64) -> String {
    format!(
        "{{\"sensor\":\"dh\",\"label\":\"Humidity\",\"value\":{value},\"unit\":\"%\",\"controls\":[\
         {{\"pin\":4,\"type\":\"digital\",\"device\":\"alarm_light\"}},\
         {{\"pin\":5,\"type\":\"digital\",\"device\":\"humidifier\"}}]}}\n"
    )
}

#[tokio::test]
async fn humidity_band_drives_both_devices_end_to_end() {
    let harness = start().await;
    let mut framer = LineFramer::new(Settings::default().raw_mode);

    // Germination is 70-80%. 72% sits below mid - tolerance: raise.
    for reading in framer.push(humidity_line(72.0).as_bytes()) {
        dispatch_reading(reading, &harness.registry, &harness.ctx);
    }
    let lines = wait_for_lines(&harness.sink, 2).await;
    assert!(lines[..2].iter().all(|l| l.ends_with("\"value\":1}")));
    assert!(lines.iter().any(|l| l.contains("\"pin\":4")));
    assert!(lines.iter().any(|l| l.contains("\"pin\":5")));

    // 85% breaches the ceiling: shut both down.
    for reading in framer.push(humidity_line(85.0).as_bytes()) {
        dispatch_reading(reading, &harness.registry, &harness.ctx);
    }
    let lines = wait_for_lines(&harness.sink, 4).await;
    assert!(lines[2..4].iter().all(|l| l.ends_with("\"value\":0}")));

    // 79% is inside the dead zone: nothing new on the wire.
    for reading in framer.push(humidity_line(79.0).as_bytes()) {
        dispatch_reading(reading, &harness.registry, &harness.ctx);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.sink.lines().len(), 4);

    harness.shutdown.request();
}

#[tokio::test]
async fn outbound_commands_keep_queue_order() {
    let harness = start().await;

    let entries: Vec<String> = (0..5)
        .map(|i| format!("{{\"command\":\"digital\",\"pin\":{i},\"value\":1}}"))
        .collect();
    for entry in &entries {
        harness.commands.send(entry.clone()).await.unwrap();
    }

    let lines = wait_for_lines(&harness.sink, entries.len()).await;
    assert_eq!(lines, entries);

    harness.shutdown.request();
}

#[tokio::test]
async fn unknown_sensor_produces_no_output() {
    let harness = start().await;
    let mut framer = LineFramer::new(false);

    let chunk = b"{\"sensor\":\"xyz\",\"label\":\"?\",\"value\":1,\"unit\":\"\",\"controls\":[]}\n";
    for reading in framer.push(chunk) {
        dispatch_reading(reading, &harness.registry, &harness.ctx);
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(harness.sink.lines().is_empty());

    harness.shutdown.request();
}

#[tokio::test]
async fn queued_phase_switch_takes_effect_and_shutdown_stops_the_loop() {
    let harness = start().await;
    assert_eq!(
        harness.resolver.active_name().as_deref(),
        Some("Germination")
    );

    harness
        .commands
        .send(phase_command("Flowering"))
        .await
        .unwrap();
    harness
        .commands
        .send(cultiva::command::shutdown_command())
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), harness.loop_handle)
        .await
        .expect("command loop did not stop")
        .unwrap();

    assert_eq!(harness.resolver.active_name().as_deref(), Some("Flowering"));
    assert!(harness.shutdown.is_requested());
    // Control commands never reach the wire.
    assert!(harness.sink.lines().is_empty());
}
