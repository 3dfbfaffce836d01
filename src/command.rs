// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound command payloads from the message bus.
//!
//! The command topic carries one of three fixed literal tokens. Anything
//! else is rejected as [`ValueError::UnsupportedCommand`]; the session task
//! logs the rejection and drops the payload without touching the state.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// A state-change request received on the command topic.
///
/// # Examples
///
/// ```
/// use outlet_core::Command;
///
/// assert_eq!(Command::parse("on").unwrap(), Command::On);
/// assert_eq!(Command::parse("toggle").unwrap(), Command::Toggle);
/// assert!(Command::parse("banana").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Request power on.
    On,
    /// Request power off.
    Off,
    /// Request negation of the current power state.
    Toggle,
}

impl Command {
    /// Parses a payload against the fixed wire tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnsupportedCommand`] for any payload that is
    /// not exactly `on`, `off` or `toggle`.
    pub fn parse(payload: &str) -> Result<Self, ValueError> {
        match payload {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            other => Err(ValueError::UnsupportedCommand(other.to_string())),
        }
    }

    /// Parses a raw payload as received from the broker.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnsupportedCommand`] for non-UTF-8 bytes or an
    /// unknown token.
    pub fn parse_bytes(payload: &[u8]) -> Result<Self, ValueError> {
        match std::str::from_utf8(payload) {
            Ok(text) => Self::parse(text),
            Err(_) => Err(ValueError::UnsupportedCommand(
                String::from_utf8_lossy(payload).into_owned(),
            )),
        }
    }

    /// Returns the wire token for this command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tokens() {
        assert_eq!(Command::parse("on").unwrap(), Command::On);
        assert_eq!(Command::parse("off").unwrap(), Command::Off);
        assert_eq!(Command::parse("toggle").unwrap(), Command::Toggle);
    }

    #[test]
    fn parse_is_strict() {
        for input in ["ON", "Off", "toggle ", " on", "1", ""] {
            assert!(
                matches!(
                    Command::parse(input),
                    Err(ValueError::UnsupportedCommand(_))
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_bytes_accepts_utf8_tokens() {
        assert_eq!(Command::parse_bytes(b"off").unwrap(), Command::Off);
    }

    #[test]
    fn parse_bytes_rejects_invalid_utf8() {
        let result = Command::parse_bytes(&[0xFF, 0xFE]);
        assert!(matches!(result, Err(ValueError::UnsupportedCommand(_))));
    }

    #[test]
    fn display_matches_wire_tokens() {
        assert_eq!(Command::On.to_string(), "on");
        assert_eq!(Command::Off.to_string(), "off");
        assert_eq!(Command::Toggle.to_string(), "toggle");
    }

    #[test]
    fn from_str_round_trip() {
        for cmd in [Command::On, Command::Off, Command::Toggle] {
            assert_eq!(cmd.as_str().parse::<Command>().unwrap(), cmd);
        }
    }
}
