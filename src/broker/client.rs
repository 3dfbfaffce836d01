// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command bus session task.
//!
//! One long-lived task maintains exactly one logical broker session at a
//! time. Each attempt builds a fresh client/event-loop pair, waits for the
//! connection acknowledgement, subscribes to the command topic, resets the
//! outbound queue and enters the operating loop: drain-and-publish, then one
//! bounded service tick. Every exit path flows back to a fresh connect
//! attempt; the task never terminates.

use std::sync::Arc;

use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS,
};

use crate::broker::BrokerConfig;
use crate::command::Command;
use crate::error::ProtocolError;
use crate::state::StateAuthority;
use crate::types::DeviceId;

/// Capacity of the client's outgoing request channel.
const REQUEST_CHANNEL_CAPACITY: usize = 10;

/// Maintains the broker session and bridges it to the state authority.
///
/// Inbound command payloads are parsed and routed to
/// [`StateAuthority::apply_command`]; status tokens produced by state writes
/// are drained from the authority's queue and published at QoS 1.
///
/// # Examples
///
/// ```ignore
/// let client = CommandBusClient::new(config, device_id, authority);
/// tokio::spawn(async move { client.run().await });
/// ```
pub struct CommandBusClient {
    config: BrokerConfig,
    device_id: DeviceId,
    authority: Arc<StateAuthority>,
}

impl CommandBusClient {
    /// Creates a client for the given configuration and state authority.
    #[must_use]
    pub fn new(config: BrokerConfig, device_id: DeviceId, authority: Arc<StateAuthority>) -> Self {
        Self {
            config,
            device_id,
            authority,
        }
    }

    /// Runs the session task. Never returns.
    ///
    /// Transport-level connect failures pause for the configured backoff
    /// before the next attempt; a rejected handshake or a lost session
    /// yields once and reconnects immediately.
    pub async fn run(self) {
        tracing::info!(
            client_id = %self.device_id,
            host = %self.config.host(),
            port = self.config.port(),
            "starting command bus task"
        );

        loop {
            if let Err(e) = self.session().await {
                if should_back_off(&e) {
                    tracing::warn!(error = %e, "broker connect failed, backing off");
                    tokio::time::sleep(self.config.reconnect_backoff()).await;
                } else {
                    tracing::warn!(error = %e, "broker session ended, reconnecting");
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    /// One connect-to-disconnect session lifetime.
    ///
    /// Only ever returns `Err`; the operating loop has no success exit.
    async fn session(&self) -> Result<(), ProtocolError> {
        let (client, mut event_loop) = self.connect();

        self.await_session_ack(&mut event_loop).await?;
        tracing::info!(host = %self.config.host(), "broker session established");

        client
            .subscribe(self.config.command_topic(), QoS::AtLeastOnce)
            .await?;

        // Discard status recorded against the previous session before the
        // first publish of this one.
        self.authority.queue().reset();

        self.operate(&client, &mut event_loop).await
    }

    /// Builds a fresh client/event-loop pair carrying the session-establish
    /// parameters: stable client identifier, keep-alive, persistent session,
    /// optional credentials.
    fn connect(&self) -> (AsyncClient, EventLoop) {
        let mut options = MqttOptions::new(
            self.device_id.to_string(),
            self.config.host(),
            self.config.port(),
        );
        options.set_keep_alive(self.config.keep_alive());
        options.set_clean_session(false);
        if let Some(credentials) = self.config.credentials() {
            options.set_credentials(credentials.username.clone(), credentials.password.clone());
        }

        AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY)
    }

    /// Drives the event loop until the broker acknowledges the session,
    /// within the configured connect window.
    async fn await_session_ack(&self, event_loop: &mut EventLoop) -> Result<(), ProtocolError> {
        let connect_timeout = self.config.connect_timeout();

        let wait = tokio::time::timeout(connect_timeout, async {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                        return if ack.code == ConnectReturnCode::Success {
                            Ok(())
                        } else {
                            Err(ProtocolError::SessionRejected(format!("{:?}", ack.code)))
                        };
                    }
                    Ok(event) => {
                        tracing::trace!(?event, "pre-session event");
                    }
                    Err(ConnectionError::ConnectionRefused(code)) => {
                        return Err(ProtocolError::SessionRejected(format!("{code:?}")));
                    }
                    Err(e) => return Err(ProtocolError::ConnectionFailed(e.to_string())),
                }
            }
        })
        .await;

        // Safe: timeout in practical use will never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = connect_timeout.as_millis() as u64;

        wait.unwrap_or(Err(ProtocolError::Timeout(timeout_ms)))
    }

    /// The operating loop: drain the queue, then one bounded service tick.
    /// Repeats until the session dies.
    async fn operate(
        &self,
        client: &AsyncClient,
        event_loop: &mut EventLoop,
    ) -> Result<(), ProtocolError> {
        loop {
            self.drain(client).await?;
            self.service_tick(event_loop).await?;
        }
    }

    /// Publishes every pending status token. A publish failure aborts the
    /// drain and forces a reconnect; the remaining tokens stay queued for
    /// the next session's reset to discard.
    async fn drain(&self, client: &AsyncClient) -> Result<(), ProtocolError> {
        while let Some(token) = self.authority.queue().try_pop() {
            tracing::debug!(
                token = %token,
                topic = %self.config.status_topic(),
                "publishing status"
            );
            client
                .publish(
                    self.config.status_topic(),
                    QoS::AtLeastOnce,
                    false,
                    token.as_str(),
                )
                .await?;
        }
        Ok(())
    }

    /// One bounded pass over the event loop: services keep-alive, delivers
    /// at most the network activity that arrives within the tick window.
    /// This is the only suspension point of the operating loop.
    async fn service_tick(&self, event_loop: &mut EventLoop) -> Result<(), ProtocolError> {
        let Ok(polled) =
            tokio::time::timeout(self.config.service_tick_timeout(), event_loop.poll()).await
        else {
            // Quiet link; nothing to deliver this tick.
            return Ok(());
        };

        match polled {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                self.handle_inbound(&publish.topic, &publish.payload);
                Ok(())
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "subscription acknowledged");
                Ok(())
            }
            Ok(Event::Incoming(Packet::Disconnect)) => Err(ProtocolError::ConnectionLost(
                "broker requested disconnect".to_string(),
            )),
            Ok(_) => Ok(()),
            Err(e) => Err(ProtocolError::ConnectionLost(e.to_string())),
        }
    }

    /// Parses an inbound payload and routes it to the state authority.
    /// Unsupported payloads are dropped with a diagnostic and no state
    /// change.
    fn handle_inbound(&self, topic: &str, payload: &[u8]) {
        if topic != self.config.command_topic() {
            return;
        }

        match Command::parse_bytes(payload) {
            Ok(command) => {
                tracing::debug!(command = %command, "bus command received");
                self.authority.apply_command(command);
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unsupported bus payload");
            }
        }
    }
}

impl std::fmt::Debug for CommandBusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBusClient")
            .field("client_id", &self.device_id)
            .field("host", &self.config.host())
            .field("port", &self.config.port())
            .finish()
    }
}

/// Transport-level connect failures get the backoff pause; everything else
/// (rejected handshake, lost session) retries after a yield.
fn should_back_off(error: &ProtocolError) -> bool {
    matches!(
        error,
        ProtocolError::ConnectionFailed(_) | ProtocolError::Timeout(_)
    )
}
