// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The control daemon: wires the serial link, dispatcher, and console
//! together and runs until shutdown.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cultiva::config::Settings;
use cultiva::controller::Context;
use cultiva::hardware::Hardware;
use cultiva::phase::{INITIAL_PHASE, PhaseResolver};
use cultiva::registry::Registry;
use cultiva::shutdown::Shutdown;
use cultiva::telemetry::TelemetryBus;
use cultiva::transport::SerialWriter;
use cultiva::{cli, dispatch, transport};

/// Outbound queue depth; producers briefly block when the link stalls.
const COMMAND_QUEUE_DEPTH: usize = 64;

#[tokio::main]
async fn main() -> cultiva::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let hardware = Hardware::default();

    let registry = Arc::new(Registry::standard(&hardware)?);
    let resolver = Arc::new(PhaseResolver::new());
    if let Some(phase) = registry.phase(INITIAL_PHASE) {
        resolver.switch(Arc::clone(phase));
    }

    let (commands, queue) = tokio::sync::mpsc::channel(COMMAND_QUEUE_DEPTH);
    let ctx = Arc::new(Context {
        devices: registry.devices().clone(),
        resolver: Arc::clone(&resolver),
        hardware,
        commands: commands.clone(),
        telemetry: TelemetryBus::new(),
    });

    let writer = Arc::new(SerialWriter::new());
    let shutdown = Shutdown::new();

    tokio::spawn(transport::run_link(
        settings,
        Arc::clone(&writer),
        Arc::clone(&registry),
        Arc::clone(&ctx),
        shutdown.clone(),
    ));
    tokio::spawn(cli::run(
        commands,
        Arc::clone(&registry),
        Arc::clone(&ctx),
        shutdown.clone(),
    ));

    dispatch::command_loop(queue, Arc::clone(&writer), registry, resolver, shutdown).await;

    // Best effort: the link task closes the port; detached controller
    // invocations are not awaited.
    writer.detach().await;
    Ok(())
}
