// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control core for a network-attached smart power outlet.
//!
//! This crate owns a single boolean power state and keeps every observer of
//! that state consistent. Requests arrive from three independent sources (a
//! physical button, a remote accessory protocol, a message-bus command
//! topic); every accepted change fans out to four sinks (relay and indicator
//! outputs, a remote protocol notification, a message-bus status report,
//! non-volatile storage).
//!
//! # Architecture
//!
//! - [`StateAuthority`] is the single mutation point. Its `apply` runs the
//!   full sink fan-out as one critical section, so concurrent sources can
//!   never interleave a stale value into a newer write.
//! - [`StatusQueue`] is the bounded, non-blocking channel that decouples
//!   fast state writes from the network: producers run in button and
//!   protocol callback contexts, the single consumer is the session task.
//! - [`CommandBusClient`] maintains the broker session as an explicit
//!   connect/subscribe/drain/tick loop that retries forever over an
//!   unreliable link, resetting the queue on every new session so stale
//!   pre-reconnect status is never replayed.
//! - The button detector, the accessory protocol stack, the WiFi workflow
//!   and the storage facility are external collaborators behind the trait
//!   seams in [`io`] and [`remote`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use outlet_core::error::StoreError;
//! use outlet_core::io::{OutputDriver, OutputRole, StateStore};
//! use outlet_core::remote::RemoteAccessory;
//! use outlet_core::types::DeviceId;
//! use outlet_core::{BrokerConfig, Outlet};
//!
//! struct Gpio;
//!
//! impl OutputDriver for Gpio {
//!     fn set_output(&self, _role: OutputRole, _level: bool) {
//!         // drive the pin
//!     }
//! }
//!
//! struct Accessory;
//!
//! impl RemoteAccessory for Accessory {
//!     fn notify(&self, _power_on: bool) {
//!         // broadcast the characteristic change
//!     }
//! }
//!
//! struct Nvs;
//!
//! impl StateStore for Nvs {
//!     fn load(&self, _key: &str) -> Result<Option<bool>, StoreError> {
//!         Ok(None)
//!     }
//!
//!     fn store(&self, _key: &str, _value: bool) -> Result<(), StoreError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> outlet_core::Result<()> {
//!     let outlet = Outlet::builder()
//!         .device_id(DeviceId::from_hardware_address([0xDE, 0xAD, 0xBE, 0x4A, 0x2F, 0xB7]))
//!         .outputs(Arc::new(Gpio))
//!         .remote(Arc::new(Accessory))
//!         .store(Arc::new(Nvs))
//!         .build()?;
//!
//!     let config = BrokerConfig::builder()
//!         .host("192.168.1.42")
//!         .credentials("user", "secret")
//!         .command_topic("outlets/command/kitchen/kettle")
//!         .status_topic("outlets/status/kitchen/kettle")
//!         .build()?;
//!
//!     // Hand clones to the button and characteristic callbacks, then run
//!     // the session task. It never returns.
//!     outlet.run_bus(config).await;
//!     Ok(())
//! }
//! ```
//!
//! # Wire contract
//!
//! The command topic carries one of the literal tokens `on`, `off` or
//! `toggle`; the status topic carries `on` or `off`. Both directions use
//! at-least-once, acknowledged delivery. Unknown command payloads are
//! logged and dropped without a state change.

pub mod broker;
mod command;
pub mod error;
pub mod io;
mod outlet;
pub mod remote;
pub mod state;
pub mod types;

pub use broker::{BrokerConfig, BrokerConfigBuilder, CommandBusClient, Credentials};
pub use command::Command;
pub use error::{ConfigError, Error, ProtocolError, Result, StoreError, ValueError};
pub use io::{OutputDriver, OutputRole, StateStore};
pub use outlet::{Outlet, OutletBuilder};
pub use remote::{AccessoryInfo, CharacteristicValue, RemoteAccessory};
pub use state::{POWER_STATE_KEY, StateAuthority, StatusQueue};
pub use types::{DeviceId, PowerState, StatusToken};
