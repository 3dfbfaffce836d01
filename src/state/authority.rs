// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single mutation point for the canonical power state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Command;
use crate::io::{OutputDriver, OutputRole, StateStore};
use crate::remote::RemoteAccessory;
use crate::state::StatusQueue;
use crate::types::StatusToken;

/// Storage key under which the power state is persisted.
pub const POWER_STATE_KEY: &str = "power_state";

/// Owns the canonical `power_on` value and fans every accepted write out to
/// all sinks.
///
/// Every state change in the system flows through [`apply`](Self::apply),
/// which runs the full sink fan-out under one mutex guard:
///
/// 1. set the canonical value;
/// 2. drive the indicator and relay outputs;
/// 3. enqueue a [`StatusToken`] for the command bus (non-blocking; overflow
///    drops the token with a warning);
/// 4. notify the remote accessory protocol;
/// 5. request durable persistence.
///
/// Concurrent callers from different contexts (button callback,
/// characteristic setter, session task) are serialized by the guard, so a
/// stale request can never interleave into a newer one's fan-out. Sink
/// failures are sink-local: they are logged and absorbed, and the remaining
/// steps still run.
///
/// Re-applying the current value deliberately re-runs the whole fan-out.
/// Collapsing no-op writes would change the observable publish frequency on
/// the status topic.
pub struct StateAuthority {
    power_on: Mutex<bool>,
    outputs: Arc<dyn OutputDriver>,
    remote: Arc<dyn RemoteAccessory>,
    store: Arc<dyn StateStore>,
    queue: Arc<StatusQueue>,
}

impl StateAuthority {
    /// Creates an authority wired to its sinks, with the canonical value
    /// initialized to off.
    ///
    /// The bootstrap loads the persisted value and performs the startup
    /// re-drive; see [`OutletBuilder`](crate::OutletBuilder).
    #[must_use]
    pub fn new(
        outputs: Arc<dyn OutputDriver>,
        remote: Arc<dyn RemoteAccessory>,
        store: Arc<dyn StateStore>,
        queue: Arc<StatusQueue>,
    ) -> Self {
        Self {
            power_on: Mutex::new(false),
            outputs,
            remote,
            store,
            queue,
        }
    }

    /// Applies a requested power state, driving every sink.
    ///
    /// Never fails and never blocks. Idempotent re-application is allowed
    /// and re-drives all sinks.
    pub fn apply(&self, requested: bool) {
        let mut power_on = self.power_on.lock();
        self.fan_out(&mut power_on, requested);
    }

    /// Negates the current state and applies the result.
    ///
    /// The read and the write happen under one guard, so two racing toggles
    /// observe each other's result instead of collapsing into one.
    pub fn toggle(&self) -> bool {
        let mut power_on = self.power_on.lock();
        let requested = !*power_on;
        self.fan_out(&mut power_on, requested);
        requested
    }

    /// Routes a parsed bus command to the matching state operation.
    pub fn apply_command(&self, command: Command) {
        match command {
            Command::On => self.apply(true),
            Command::Off => self.apply(false),
            Command::Toggle => {
                let _ = self.toggle();
            }
        }
    }

    /// Returns the canonical power state.
    #[must_use]
    pub fn power_on(&self) -> bool {
        *self.power_on.lock()
    }

    /// Returns the queue this authority publishes tokens into.
    #[must_use]
    pub fn queue(&self) -> &Arc<StatusQueue> {
        &self.queue
    }

    // The five-step sequence. The caller holds the guard, which makes the
    // whole fan-out one critical section.
    fn fan_out(&self, power_on: &mut bool, requested: bool) {
        *power_on = requested;

        self.outputs.set_output(OutputRole::Indicator, requested);
        self.outputs.set_output(OutputRole::Relay, requested);

        let token = StatusToken::from(requested);
        if !self.queue.try_push(token) {
            tracing::warn!(token = %token, "status queue full, dropping token");
        }

        self.remote.notify(requested);

        if let Err(e) = self.store.store(POWER_STATE_KEY, requested) {
            tracing::warn!(error = %e, "failed to persist power state");
        }
    }
}

impl std::fmt::Debug for StateAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateAuthority")
            .field("power_on", &self.power_on())
            .field("queued", &self.queue.len())
            .finish()
    }
}
