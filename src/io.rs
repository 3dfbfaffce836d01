// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator seams for physical I/O and persistence.
//!
//! The state authority drives hardware and storage through these traits and
//! never touches a pin or a flash sector directly. Implementations live with
//! the embedder (GPIO driver, NVS wrapper, test doubles). All methods must be
//! non-blocking: they are called from inside the authority's critical
//! section, possibly from interrupt-adjacent contexts.

use crate::error::StoreError;

/// Role of a physical output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputRole {
    /// The status indicator (LED).
    Indicator,
    /// The load-switching relay.
    Relay,
}

impl OutputRole {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Indicator => "indicator",
            Self::Relay => "relay",
        }
    }
}

/// Drives the physical indicator and relay outputs.
///
/// Implementations use interior mutability where the underlying driver needs
/// it; the authority always calls through a shared reference.
pub trait OutputDriver: Send + Sync {
    /// Sets the output for the given role high (`true`) or low (`false`).
    fn set_output(&self, role: OutputRole, level: bool);
}

/// Best-effort durable key/value storage for the power state.
///
/// No transactional guarantee is assumed. The authority treats writes as
/// fire-and-forget: a [`StoreError`] is logged and absorbed, never
/// escalated.
pub trait StateStore: Send + Sync {
    /// Loads a previously stored value, or `None` if no record exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the backing store failed; the caller
    /// falls back to the default state.
    fn load(&self, key: &str) -> Result<Option<bool>, StoreError>;

    /// Stores a value durably, best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the backing store failed; the caller
    /// logs and carries on.
    fn store(&self, key: &str, value: bool) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_role_labels() {
        assert_eq!(OutputRole::Indicator.as_str(), "indicator");
        assert_eq!(OutputRole::Relay.as_str(), "relay");
    }
}
