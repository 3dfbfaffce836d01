// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command bus configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default broker port.
const DEFAULT_PORT: u16 = 1883;

/// Default keep-alive interval for the broker session.
const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(10);

/// Default bounded wait for a connection acknowledgement.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pause between failed connect attempts.
const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_millis(100);

/// Default bound on one service tick of the operating loop.
const DEFAULT_SERVICE_TICK_TIMEOUT: Duration = Duration::from_secs(1);

/// Username/password pair for broker authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Broker username.
    pub username: String,
    /// Broker password.
    pub password: String,
}

/// Static configuration for the command bus client.
///
/// Host and the two topics are required; everything else has a default.
/// Construct via [`BrokerConfig::builder`] or load from a JSON document with
/// [`BrokerConfig::from_json`].
///
/// # Examples
///
/// ```
/// use outlet_core::BrokerConfig;
///
/// let config = BrokerConfig::builder()
///     .host("192.168.1.42")
///     .command_topic("outlets/command/kitchen/kettle")
///     .status_topic("outlets/status/kitchen/kettle")
///     .credentials("user", "secret")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.port(), 1883);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    credentials: Option<Credentials>,
    command_topic: String,
    status_topic: String,
    #[serde(default = "default_keep_alive")]
    keep_alive: Duration,
    #[serde(default = "default_connect_timeout")]
    connect_timeout: Duration,
    #[serde(default = "default_reconnect_backoff")]
    reconnect_backoff: Duration,
    #[serde(default = "default_service_tick_timeout")]
    service_tick_timeout: Duration,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_keep_alive() -> Duration {
    DEFAULT_KEEP_ALIVE
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_reconnect_backoff() -> Duration {
    DEFAULT_RECONNECT_BACKOFF
}

fn default_service_tick_timeout() -> Duration {
    DEFAULT_SERVICE_TICK_TIMEOUT
}

impl BrokerConfig {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> BrokerConfigBuilder {
        BrokerConfigBuilder::default()
    }

    /// Loads a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON and
    /// [`ConfigError::MissingField`] when a required field is empty.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the credentials, if configured.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Returns the topic inbound commands arrive on.
    #[must_use]
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// Returns the topic status tokens are published to.
    #[must_use]
    pub fn status_topic(&self) -> &str {
        &self.status_topic
    }

    /// Returns the session keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the bounded wait for a connection acknowledgement.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the pause between failed connect attempts.
    #[must_use]
    pub fn reconnect_backoff(&self) -> Duration {
        self.reconnect_backoff
    }

    /// Returns the bound on one service tick of the operating loop.
    #[must_use]
    pub fn service_tick_timeout(&self) -> Duration {
        self.service_tick_timeout
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingField("host"));
        }
        if self.command_topic.is_empty() {
            return Err(ConfigError::MissingField("command_topic"));
        }
        if self.status_topic.is_empty() {
            return Err(ConfigError::MissingField("status_topic"));
        }
        Ok(())
    }
}

/// Builder for [`BrokerConfig`].
#[derive(Debug, Default)]
pub struct BrokerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    credentials: Option<Credentials>,
    command_topic: Option<String>,
    status_topic: Option<String>,
    keep_alive: Option<Duration>,
    connect_timeout: Option<Duration>,
    reconnect_backoff: Option<Duration>,
    service_tick_timeout: Option<Duration>,
}

impl BrokerConfigBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Sets the command topic.
    #[must_use]
    pub fn command_topic(mut self, topic: impl Into<String>) -> Self {
        self.command_topic = Some(topic.into());
        self
    }

    /// Sets the status topic.
    #[must_use]
    pub fn status_topic(mut self, topic: impl Into<String>) -> Self {
        self.status_topic = Some(topic.into());
        self
    }

    /// Sets the keep-alive interval (default: 10 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets the bounded connect wait (default: 10 seconds).
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Sets the pause between failed connect attempts (default: 100 ms).
    #[must_use]
    pub fn reconnect_backoff(mut self, duration: Duration) -> Self {
        self.reconnect_backoff = Some(duration);
        self
    }

    /// Sets the bound on one service tick (default: 1 second).
    #[must_use]
    pub fn service_tick_timeout(mut self, duration: Duration) -> Self {
        self.service_tick_timeout = Some(duration);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if host or either topic is
    /// missing or empty.
    pub fn build(self) -> Result<BrokerConfig, ConfigError> {
        let config = BrokerConfig {
            host: self.host.unwrap_or_default(),
            port: self.port.unwrap_or(DEFAULT_PORT),
            credentials: self.credentials,
            command_topic: self.command_topic.unwrap_or_default(),
            status_topic: self.status_topic.unwrap_or_default(),
            keep_alive: self.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            reconnect_backoff: self.reconnect_backoff.unwrap_or(DEFAULT_RECONNECT_BACKOFF),
            service_tick_timeout: self
                .service_tick_timeout
                .unwrap_or(DEFAULT_SERVICE_TICK_TIMEOUT),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> BrokerConfigBuilder {
        BrokerConfig::builder()
            .host("broker.local")
            .command_topic("outlets/command/test")
            .status_topic("outlets/status/test")
    }

    #[test]
    fn builder_defaults() {
        let config = minimal().build().unwrap();
        assert_eq!(config.port(), 1883);
        assert!(config.credentials().is_none());
        assert_eq!(config.keep_alive(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.reconnect_backoff(), Duration::from_millis(100));
        assert_eq!(config.service_tick_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn builder_chain() {
        let config = minimal()
            .port(8883)
            .credentials("admin", "secret")
            .keep_alive(Duration::from_secs(30))
            .reconnect_backoff(Duration::from_millis(250))
            .build()
            .unwrap();

        assert_eq!(config.port(), 8883);
        assert_eq!(config.credentials().unwrap().username, "admin");
        assert_eq!(config.keep_alive(), Duration::from_secs(30));
        assert_eq!(config.reconnect_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn builder_missing_host_fails() {
        let result = BrokerConfig::builder()
            .command_topic("cmd")
            .status_topic("stat")
            .build();
        assert!(matches!(result, Err(ConfigError::MissingField("host"))));
    }

    #[test]
    fn builder_missing_topics_fail() {
        let result = BrokerConfig::builder().host("broker.local").build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("command_topic"))
        ));

        let result = BrokerConfig::builder()
            .host("broker.local")
            .command_topic("cmd")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingField("status_topic"))
        ));
    }

    #[test]
    fn from_json_with_defaults() {
        let config = BrokerConfig::from_json(
            r#"{
                "host": "192.168.1.42",
                "command_topic": "outlets/command/kitchen/kettle",
                "status_topic": "outlets/status/kitchen/kettle"
            }"#,
        )
        .unwrap();

        assert_eq!(config.host(), "192.168.1.42");
        assert_eq!(config.port(), 1883);
        assert_eq!(config.keep_alive(), Duration::from_secs(10));
    }

    #[test]
    fn from_json_with_credentials() {
        let config = BrokerConfig::from_json(
            r#"{
                "host": "broker.local",
                "port": 8883,
                "credentials": {"username": "user", "password": "pass"},
                "command_topic": "cmd",
                "status_topic": "stat"
            }"#,
        )
        .unwrap();

        assert_eq!(config.port(), 8883);
        assert_eq!(config.credentials().unwrap().password, "pass");
    }

    #[test]
    fn from_json_rejects_empty_host() {
        let result = BrokerConfig::from_json(
            r#"{"host": "", "command_topic": "cmd", "status_topic": "stat"}"#,
        );
        assert!(matches!(result, Err(ConfigError::MissingField("host"))));
    }

    #[test]
    fn from_json_rejects_malformed_document() {
        let result = BrokerConfig::from_json("{not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn json_round_trip() {
        let config = minimal().credentials("u", "p").build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = BrokerConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
