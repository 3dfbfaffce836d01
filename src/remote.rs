// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote accessory protocol seam.
//!
//! The smart-home accessory stack (service and characteristic registration,
//! wire encoding, delivery retries) is an external collaborator. The core
//! only needs two contracts from it: a way to broadcast a changed value to
//! subscribed controllers, and an untyped value representation so the
//! characteristic setter can reject payloads of the wrong format before they
//! reach the state authority.

use std::fmt;

use crate::error::ValueError;
use crate::types::DeviceId;

/// Pushes characteristic change notifications to remote controllers.
///
/// Delivery is best-effort; retries and per-subscriber broadcast are the
/// protocol stack's concern. Called from inside the state authority's
/// critical section, so implementations must not block.
pub trait RemoteAccessory: Send + Sync {
    /// Notifies subscribed controllers of the new power state.
    fn notify(&self, power_on: bool);
}

/// A characteristic value as delivered by the remote protocol stack.
///
/// The protocol is dynamically typed on the wire; the outlet's only
/// characteristic is boolean, so the setter validates the format and drops
/// everything else with a diagnostic.
///
/// # Examples
///
/// ```
/// use outlet_core::remote::CharacteristicValue;
///
/// assert_eq!(CharacteristicValue::Bool(true).as_bool(), Some(true));
/// assert_eq!(CharacteristicValue::Int(1).as_bool(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CharacteristicValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
}

impl CharacteristicValue {
    /// Returns the boolean payload, or `None` for any other format.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload, or the format mismatch as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidFormat`] for any non-boolean format.
    pub fn expect_bool(&self) -> Result<bool, ValueError> {
        self.as_bool()
            .ok_or(ValueError::InvalidFormat(self.format()))
    }

    /// Returns the format name for diagnostics.
    #[must_use]
    pub const fn format(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Static identification block the accessory protocol advertises.
///
/// The serial number is the hardware-derived device identity, so a device
/// keeps the same advertised identity across re-pairings and restarts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    /// Human-readable accessory name.
    pub name: String,
    /// Manufacturer string.
    pub manufacturer: String,
    /// Model string.
    pub model: String,
    /// Firmware revision string.
    pub firmware_revision: String,
    /// Serial number (the device identity string).
    pub serial_number: String,
}

impl AccessoryInfo {
    /// Builds the identification block for a device.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        firmware_revision: impl Into<String>,
        device_id: DeviceId,
    ) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            model: model.into(),
            firmware_revision: firmware_revision.into(),
            serial_number: device_id.to_string(),
        }
    }

    /// Builds a default block advertising the device identity as the name.
    #[must_use]
    pub fn for_device(device_id: DeviceId) -> Self {
        Self::new(
            device_id.to_string(),
            "outlet_core",
            "smart-outlet",
            env!("CARGO_PKG_VERSION"),
            device_id,
        )
    }
}

impl fmt::Display for AccessoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.manufacturer, self.model)
    }
}
