// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `cultiva` control loop.
//!
//! This module provides the error hierarchy for failures across the crate:
//! wire parsing, serial transport, growth-phase resolution, and lookup
//! misses. Per the control-loop design, none of these are fatal to the
//! dispatch pipeline — they are caught and logged at the boundary where
//! they occur.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while parsing inbound telemetry or a queued command.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred on the serial transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error occurred while resolving growth-phase parameters.
    #[error("phase error: {0}")]
    Phase(#[from] PhaseError),

    /// No device is registered under the given identifier.
    #[error("no device registered for: {0}")]
    DeviceNotFound(String),

    /// The outbound command queue was closed.
    #[error("command queue closed")]
    QueueClosed,
}

/// Errors related to parsing wire data and queued commands.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The data was valid JSON but not the expected shape.
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),
}

/// Errors related to the serial transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Opening or configuring the serial port failed.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Reading or writing the port failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A write was attempted while the link is down.
    #[error("serial link is not connected")]
    NotConnected,

    /// Fewer bytes were written than expected.
    #[error("incomplete write: {written} of {expected} bytes")]
    IncompleteWrite {
        /// Bytes actually written.
        written: usize,
        /// Bytes that should have been written.
        expected: usize,
    },
}

/// Errors related to growth-phase configuration and resolution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhaseError {
    /// A phase parameter was requested before any phase was activated.
    #[error("no growth phase has been set")]
    NotSet,

    /// A phase switch named a phase that is not in the catalog.
    #[error("unknown growth phase: {0}")]
    Unknown(String),

    /// A parameter band was constructed with floor above ceiling.
    #[error("invalid band for {param}: floor {floor} > ceil {ceil}")]
    InvalidBand {
        /// The parameter pair the band belongs to.
        param: String,
        /// Lower bound.
        floor: f64,
        /// Upper bound.
        ceil: f64,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
