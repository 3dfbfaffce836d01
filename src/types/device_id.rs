// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

/// Deterministic device identity derived from the hardware address.
///
/// The identity string is the fixed prefix followed by the uppercase
/// hexadecimal of the last three octets of the station MAC address, e.g.
/// `ESP-4A2FB7`. The same string serves as the MQTT client identifier and
/// as the advertised accessory name, so a device keeps its identity across
/// restarts and broker sessions.
///
/// # Examples
///
/// ```
/// use outlet_core::types::DeviceId;
///
/// let id = DeviceId::from_hardware_address([0xDE, 0xAD, 0xBE, 0x4A, 0x2F, 0xB7]);
/// assert_eq!(id.to_string(), "ESP-4A2FB7");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    suffix: [u8; 3],
}

impl DeviceId {
    /// Prefix of every identity string.
    pub const PREFIX: &'static str = "ESP";

    /// Derives the identity from a 6-byte hardware (MAC) address.
    ///
    /// Only the last three octets participate; the vendor prefix carries no
    /// per-device information.
    #[must_use]
    pub const fn from_hardware_address(mac: [u8; 6]) -> Self {
        Self {
            suffix: [mac[3], mac[4], mac[5]],
        }
    }

    /// Returns the three address octets that make up the identity.
    #[must_use]
    pub const fn suffix(&self) -> [u8; 3] {
        self.suffix
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({self})")
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02X}{:02X}{:02X}",
            Self::PREFIX,
            self.suffix[0],
            self.suffix[1],
            self.suffix[2]
        )
    }
}
