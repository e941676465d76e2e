// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serial port handling: framed reads, writes, and reconnection.
//!
//! The port is owned exclusively by this module. Reads happen on a
//! dedicated thread (the `serialport` crate is blocking) feeding chunks
//! into an async channel; the framer and dispatcher consume them on the
//! runtime. Writes go through [`SerialWriter`], whose handle is swapped
//! on every reconnect.
//!
//! Data lost while the link is down is not replayed: sensor delivery is
//! at-most-once across a disconnect.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};

use crate::config::Settings;
use crate::controller::Context;
use crate::dispatch::dispatch_reading;
use crate::error::{Result, TransportError};
use crate::registry::Registry;
use crate::shutdown::Shutdown;
use crate::telemetry::LineFramer;

/// Fixed delay before a reconnect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Blocking-read timeout; bounds how long the reader thread sleeps
/// between wakeups.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Read buffer size per chunk.
const CHUNK_SIZE: usize = 256;

/// Write half of the serial link.
///
/// The sink is `None` while the link is down; the reconnect loop attaches
/// a fresh handle after each successful open. Empty commands are ignored
/// with a warning rather than sent.
#[derive(Default)]
pub struct SerialWriter {
    sink: Mutex<Option<Box<dyn Write + Send>>>,
}

impl SerialWriter {
    /// Creates a detached writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new sink, replacing any previous one.
    pub async fn attach(&self, sink: Box<dyn Write + Send>) {
        *self.sink.lock().await = Some(sink);
    }

    /// Drops the current sink.
    pub async fn detach(&self) {
        *self.sink.lock().await = None;
    }

    /// Whether a sink is currently attached.
    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    /// Writes one command line to the microcontroller.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] while the link is down and
    /// I/O errors from the port itself.
    pub async fn send(&self, command: &str) -> Result<()> {
        if command.is_empty() {
            tracing::warn!("Empty command ignored");
            return Ok(());
        }

        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(TransportError::NotConnected)?;

        tracing::info!(command = %command, "Sending command");
        let payload = format!("{command}\n");
        sink.write_all(payload.as_bytes())
            .and_then(|()| sink.flush())
            .map_err(TransportError::Io)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialWriter").finish_non_exhaustive()
    }
}

/// Runs the serial link until shutdown: open, pump, reconnect.
///
/// Each connection attempt opens the configured port, attaches the writer,
/// and pumps framed readings into the dispatcher until the port fails.
/// After a failure (or a failed open) the loop waits [`RECONNECT_DELAY`]
/// and tries again.
pub async fn run_link(
    settings: Settings,
    writer: Arc<SerialWriter>,
    registry: Arc<Registry>,
    ctx: Arc<Context>,
    shutdown: Shutdown,
) {
    loop {
        if shutdown.is_requested() {
            break;
        }

        match open_port(&settings) {
            Ok(port) => {
                tracing::info!(port = %settings.serial_port, "Serial link connected");
                match port.try_clone() {
                    Ok(write_half) => writer.attach(Box::new(write_half)).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "No write half for this connection");
                    }
                }

                // A fresh framer per connection: a partial line cut off by
                // the outage must not prefix the first line after it.
                let mut framer = LineFramer::new(settings.raw_mode);

                pump_readings(port, &mut framer, &registry, &ctx, &shutdown).await;
                writer.detach().await;

                if shutdown.is_requested() {
                    break;
                }
                tracing::warn!("Serial connection lost");
            }
            Err(e) => {
                tracing::warn!(port = %settings.serial_port, error = %e,
                    "Failed to open serial port");
            }
        }

        tracing::info!(delay = ?RECONNECT_DELAY, "Attempting to reconnect");
        tokio::select! {
            () = tokio::time::sleep(RECONNECT_DELAY) => {}
            () = shutdown.wait() => break,
        }
    }

    tracing::info!("Serial link stopped");
}

fn open_port(settings: &Settings) -> std::result::Result<Box<dyn serialport::SerialPort>, TransportError> {
    serialport::new(&settings.serial_port, settings.baud_rate)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(TransportError::Serial)
}

/// Pumps chunks from the reader thread into the framer until the port
/// dies or shutdown is requested.
async fn pump_readings(
    port: Box<dyn serialport::SerialPort>,
    framer: &mut LineFramer,
    registry: &Arc<Registry>,
    ctx: &Arc<Context>,
    shutdown: &Shutdown,
) {
    let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(64);
    spawn_reader_thread(port, chunk_tx);

    loop {
        tokio::select! {
            maybe_chunk = chunk_rx.recv() => match maybe_chunk {
                Some(chunk) => {
                    for reading in framer.push(&chunk) {
                        dispatch_reading(reading, registry, ctx);
                    }
                }
                // Reader thread exited: the port is gone.
                None => break,
            },
            () = shutdown.wait() => break,
        }
    }
}

/// Reads the port on a plain thread, forwarding chunks to the runtime.
///
/// The thread exits when the port errors out or the receiving side is
/// dropped; read timeouts just loop so the channel closure is noticed.
fn spawn_reader_thread(
    mut port: Box<dyn serialport::SerialPort>,
    chunk_tx: mpsc::Sender<Vec<u8>>,
) {
    std::thread::spawn(move || {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            match port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if chunk_tx.blocking_send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::Interrupted =>
                {
                    if chunk_tx.is_closed() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Serial read failed");
                    break;
                }
            }
        }
    });
}
