// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The serial link to the microcontroller.

mod serial;

pub use serial::{RECONNECT_DELAY, SerialWriter, run_link};
