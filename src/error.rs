// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the outlet control core.
//!
//! No error in this crate is fatal: the core favors availability over strict
//! delivery guarantees. Transient network failures are retried forever,
//! malformed input is dropped with a diagnostic, and persistence failures are
//! absorbed by the caller. The types here exist so that collaborators and
//! sinks can report failures in a structured way for the core to log.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload or characteristic value failed validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Broker transport or session failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Persistent storage failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid builder input or configuration document.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors for malformed input from the command bus or the remote protocol.
///
/// These are always dropped with a diagnostic log and never cause a state
/// mutation or propagate back to the sender.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An inbound command payload did not match any known token.
    #[error("unsupported command payload: {0:?}")]
    UnsupportedCommand(String),

    /// A power state string was not one of the wire tokens.
    #[error("invalid power state: {0:?}")]
    InvalidPowerState(String),

    /// The remote protocol delivered a characteristic value of the wrong
    /// format.
    #[error("invalid characteristic format: expected bool, got {0}")]
    InvalidFormat(&'static str),
}

/// Errors related to the broker link.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request (publish/subscribe).
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The transport-level connection to the broker could not be
    /// established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker refused the session-establish request.
    #[error("session rejected: {0}")]
    SessionRejected(String),

    /// An established session died.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// The connection attempt did not complete within the bounded window.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),
}

/// Errors reported by the persisted state store.
///
/// The store is best-effort; the core logs these and carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading a key failed.
    #[error("read failed for key {key:?}: {message}")]
    Read {
        /// The key that was read.
        key: String,
        /// Description of the failure.
        message: String,
    },

    /// Writing a key failed.
    #[error("write failed for key {key:?}: {message}")]
    Write {
        /// The key that was written.
        key: String,
        /// Description of the failure.
        message: String,
    },
}

/// Errors from builders and configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required builder field was not set.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A configuration document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::UnsupportedCommand("banana".to_string());
        assert_eq!(err.to_string(), "unsupported command payload: \"banana\"");
    }

    #[test]
    fn error_from_value_error() {
        let value_err = ValueError::InvalidFormat("string");
        let err: Error = value_err.into();
        assert!(matches!(
            err,
            Error::Value(ValueError::InvalidFormat("string"))
        ));
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::Timeout(10_000);
        assert_eq!(err.to_string(), "connection timed out after 10000 ms");
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Write {
            key: "power_state".to_string(),
            message: "flash sector busy".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "write failed for key \"power_state\": flash sector busy"
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingField("host");
        assert_eq!(err.to_string(), "missing required field: host");
    }
}
