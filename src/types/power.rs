// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state types for the outlet core.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// On/off state of the outlet.
///
/// The wire representation is the lowercase token used on the status topic.
///
/// # Examples
///
/// ```
/// use outlet_core::types::PowerState;
///
/// assert_eq!(PowerState::On.as_str(), "on");
/// assert_eq!(PowerState::Off.as_str(), "off");
/// assert_eq!(PowerState::from(true), PowerState::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Power is off.
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns the wire token for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
        }
    }

    /// Returns `true` if the state is [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            _ => Err(ValueError::InvalidPowerState(s.to_string())),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(state: PowerState) -> Self {
        state.is_on()
    }
}

/// Snapshot of the power state at the moment of a state write.
///
/// Produced by the state authority on every accepted write and consumed by
/// the command bus client, which publishes the token text on the status
/// topic. Value semantics; two tokens carrying the same state are equal.
///
/// # Examples
///
/// ```
/// use outlet_core::types::{PowerState, StatusToken};
///
/// let token = StatusToken::from(true);
/// assert_eq!(token.as_str(), "on");
/// assert_eq!(token.state(), PowerState::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusToken(PowerState);

impl StatusToken {
    /// Creates a token snapshotting the given state.
    #[must_use]
    pub const fn new(state: PowerState) -> Self {
        Self(state)
    }

    /// Returns the snapshotted state.
    #[must_use]
    pub const fn state(&self) -> PowerState {
        self.0
    }

    /// Returns the wire text published on the status topic.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0.as_str()
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<PowerState> for StatusToken {
    fn from(state: PowerState) -> Self {
        Self(state)
    }
}

impl From<bool> for StatusToken {
    fn from(power_on: bool) -> Self {
        Self(PowerState::from(power_on))
    }
}
