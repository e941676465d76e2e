// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operator console boundary.
//!
//! Translates typed lines into the same queue entries the dispatcher
//! consumes; the core never learns where a command came from.
//!
//! ```text
//! phase <Name>              switch the growth phase
//! exit                      request shutdown
//! sim <json-reading>        inject a sensor reading into dispatch
//! <type> <pin> <value>      raw device command, e.g. `digital 4 1`
//! ```

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{CommandSender, DeviceCommand, phase_command, shutdown_command};
use crate::controller::Context;
use crate::dispatch::dispatch_reading;
use crate::registry::Registry;
use crate::shutdown::Shutdown;
use crate::telemetry::parse_reading;

/// Reads operator input from stdin until `exit` or shutdown.
pub async fn run(
    commands: CommandSender,
    registry: Arc<Registry>,
    ctx: Arc<Context>,
    shutdown: Shutdown,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            () = shutdown.wait() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if !handle_line(line.trim(), &commands, &registry, &ctx).await {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Console read failed");
                    break;
                }
            },
        }
    }

    tracing::info!("Console stopped");
}

/// Handles one input line; returns false when the console should stop.
async fn handle_line(
    line: &str,
    commands: &CommandSender,
    registry: &Arc<Registry>,
    ctx: &Arc<Context>,
) -> bool {
    if line.is_empty() {
        return true;
    }

    if let Some(name) = line.strip_prefix("phase ") {
        if commands.send(phase_command(name.trim())).await.is_err() {
            return false;
        }
        return true;
    }

    if line == "exit" {
        let _ = commands.send(shutdown_command()).await;
        return false;
    }

    if let Some(payload) = line.strip_prefix("sim ") {
        match parse_reading(payload.trim()) {
            Ok(reading) => dispatch_reading(reading, registry, ctx),
            Err(e) => tracing::warn!(error = %e, "Invalid simulated reading"),
        }
        return true;
    }

    match parse_raw_command(line) {
        Some(cmd) => {
            if commands.send(cmd.to_json()).await.is_err() {
                return false;
            }
        }
        None => {
            tracing::warn!(input = %line, "Invalid input; use <type> <pin> <value>");
        }
    }
    true
}

/// Parses `<type> <pin> <value>` into a device command.
fn parse_raw_command(line: &str) -> Option<DeviceCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [kind, pin, value] = parts.as_slice() else {
        return None;
    };

    let pin: u16 = pin.parse().ok()?;
    let cmd = if value.contains('.') {
        DeviceCommand::new(kind, pin, value.parse::<f64>().ok()?)
    } else {
        DeviceCommand::new(kind, pin, value.parse::<i64>().ok()?)
    };
    Some(cmd)
}
