// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State synchronization engine.
//!
//! [`StateAuthority`] is the only code path allowed to change the canonical
//! power state; [`StatusQueue`] is the bounded channel that carries status
//! snapshots from state writes to the broker session task.
//!
//! # Examples
//!
//! ```ignore
//! let authority = StateAuthority::new(outputs, remote, store, queue);
//! authority.apply(true);
//! assert!(authority.power_on());
//! ```

mod authority;
mod status_queue;

pub use authority::{POWER_STATE_KEY, StateAuthority};
pub use status_queue::{DEFAULT_CAPACITY, StatusQueue};
