// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line framing for the inbound serial byte stream.

use super::reading::{SensorReading, parse_reading};

/// Sensor id the microcontroller uses to report its own faults.
const FAULT_SENSOR_ID: &str = "error";

/// Reassembles newline-delimited JSON sensor records from raw chunks.
///
/// The framer appends every chunk to an internal buffer, splits on `\n`,
/// and parses each complete line as a [`SensorReading`]. The trailing
/// partial line is retained for the next chunk. Parse failures are logged
/// and dropped; they are never fatal. Readings whose sensor id is `error`
/// are device-reported faults: they are logged and withheld from dispatch.
///
/// In raw mode the framer bypasses parsing entirely and logs each complete
/// line verbatim, which is useful when diagnosing the wire protocol.
///
/// # Examples
///
/// ```
/// use cultiva::telemetry::LineFramer;
///
/// let mut framer = LineFramer::new(false);
/// let readings = framer.push(b"{\"sensor\":\"dt\",\"label\":\"T\",\"value\":25,\"unit\":\"C\"}\n");
/// assert_eq!(readings.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
    raw_mode: bool,
}

impl LineFramer {
    /// Creates a framer. With `raw_mode` set, lines are logged, not parsed.
    #[must_use]
    pub fn new(raw_mode: bool) -> Self {
        Self {
            buffer: String::new(),
            raw_mode,
        }
    }

    /// Consumes one chunk of bytes and returns the readings completed by it.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the microcontroller
    /// occasionally garbles a byte around reset.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SensorReading> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        if !self.buffer.contains('\n') {
            return Vec::new();
        }

        let mut readings = Vec::new();
        let mut lines: Vec<String> = self.buffer.split('\n').map(str::to_string).collect();
        // The last fragment is incomplete; keep it buffered.
        self.buffer = lines.pop().unwrap_or_default();

        for line in &lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.raw_mode {
                tracing::info!(raw = %line, "Raw line");
                continue;
            }
            match parse_reading(line) {
                Ok(reading) if reading.sensor == FAULT_SENSOR_ID => {
                    tracing::warn!(value = reading.value, label = %reading.label,
                        "Device-reported fault");
                }
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    tracing::warn!(line = %line, error = %e, "Dropping unparseable line");
                }
            }
        }

        readings
    }

    /// Returns the currently buffered partial line.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_line(sensor: &str, value: f64) -> String {
        format!(r#"{{"sensor":"{sensor}","label":"L","value":{value},"unit":"u","controls":[]}}"#)
    }

    #[test]
    fn single_complete_line() {
        let mut framer = LineFramer::new(false);
        let readings = framer.push(format!("{}\n", reading_line("dt", 25.0)).as_bytes());

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor, "dt");
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn partial_line_is_retained_across_chunks() {
        let mut framer = LineFramer::new(false);
        let line = reading_line("dh", 70.0);
        let (head, tail) = line.split_at(10);

        assert!(framer.push(head.as_bytes()).is_empty());
        assert_eq!(framer.pending(), head);

        let readings = framer.push(format!("{tail}\n").as_bytes());
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor, "dh");
    }

    #[test]
    fn multiple_lines_in_one_chunk() {
        let mut framer = LineFramer::new(false);
        let chunk = format!(
            "{}\n{}\n{}",
            reading_line("dt", 25.0),
            reading_line("dh", 70.0),
            reading_line("sm", 400.0)
        );

        let readings = framer.push(chunk.as_bytes());
        assert_eq!(readings.len(), 2);
        // Third line had no terminator yet.
        assert_eq!(framer.pending(), reading_line("sm", 400.0));
    }

    #[test]
    fn invalid_json_is_dropped_not_fatal() {
        let mut framer = LineFramer::new(false);
        let chunk = format!("garbage\n{}\n", reading_line("dt", 25.0));

        let readings = framer.push(chunk.as_bytes());
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sensor, "dt");
    }

    #[test]
    fn fault_readings_are_withheld() {
        let mut framer = LineFramer::new(false);
        let chunk = format!("{}\n", reading_line("error", 17.0));

        assert!(framer.push(chunk.as_bytes()).is_empty());
    }

    #[test]
    fn raw_mode_bypasses_parsing() {
        let mut framer = LineFramer::new(true);
        let chunk = format!("{}\n", reading_line("dt", 25.0));

        assert!(framer.push(chunk.as_bytes()).is_empty());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut framer = LineFramer::new(false);
        assert!(framer.push(b"\n\r\n\n").is_empty());
    }
}
