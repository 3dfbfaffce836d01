// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bootstrap wiring for one outlet.
//!
//! [`OutletBuilder`] assembles the core from the external collaborators,
//! restores the persisted power state and performs the startup re-drive, so
//! outputs, notification and persistence agree with the stored value before
//! any source fires. The built [`Outlet`] exposes the three source entry
//! points: the button callback, the remote characteristic accessors and the
//! command bus task.

use std::sync::Arc;

use crate::broker::{BrokerConfig, CommandBusClient};
use crate::error::ConfigError;
use crate::io::{OutputDriver, StateStore};
use crate::remote::{AccessoryInfo, CharacteristicValue, RemoteAccessory};
use crate::state::{POWER_STATE_KEY, StateAuthority, StatusQueue};
use crate::types::DeviceId;

/// A wired outlet core.
///
/// Cheaply cloneable; hand clones to the button callback, the
/// characteristic hooks and the bus task.
///
/// # Examples
///
/// ```ignore
/// let outlet = Outlet::builder()
///     .device_id(device_id)
///     .outputs(gpio)
///     .remote(accessory)
///     .store(nvs)
///     .build()?;
///
/// button.on_activate({
///     let outlet = outlet.clone();
///     move || outlet.handle_button()
/// });
/// tokio::spawn({
///     let outlet = outlet.clone();
///     async move { outlet.run_bus(config).await }
/// });
/// ```
#[derive(Clone)]
pub struct Outlet {
    device_id: DeviceId,
    info: AccessoryInfo,
    authority: Arc<StateAuthority>,
}

impl Outlet {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> OutletBuilder {
        OutletBuilder::default()
    }

    /// Returns the device identity.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    /// Returns the advertised accessory identification block.
    #[must_use]
    pub fn accessory_info(&self) -> &AccessoryInfo {
        &self.info
    }

    /// Returns the canonical power state.
    #[must_use]
    pub fn power_on(&self) -> bool {
        self.authority.power_on()
    }

    /// Applies a requested power state, driving every sink.
    pub fn apply(&self, requested: bool) {
        self.authority.apply(requested);
    }

    /// Entry point for the debounced button activation: toggle.
    pub fn handle_button(&self) {
        tracing::info!("button activated, toggling outlet");
        let _ = self.authority.toggle();
    }

    /// Getter hook for the remote protocol's boolean characteristic.
    #[must_use]
    pub fn characteristic_get(&self) -> bool {
        self.authority.power_on()
    }

    /// Setter hook for the remote protocol's boolean characteristic.
    ///
    /// Non-boolean formats are rejected with a logged diagnostic and no
    /// state change.
    pub fn characteristic_set(&self, value: &CharacteristicValue) {
        match value.expect_bool() {
            Ok(requested) => self.authority.apply(requested),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting characteristic write");
            }
        }
    }

    /// Returns the outbound status queue, for observability.
    #[must_use]
    pub fn queue(&self) -> &Arc<StatusQueue> {
        self.authority.queue()
    }

    /// Builds the command bus client for this outlet.
    #[must_use]
    pub fn bus_client(&self, config: BrokerConfig) -> CommandBusClient {
        CommandBusClient::new(config, self.device_id, Arc::clone(&self.authority))
    }

    /// Runs the command bus session task. Never returns.
    pub async fn run_bus(&self, config: BrokerConfig) {
        self.bus_client(config).run().await;
    }
}

impl std::fmt::Debug for Outlet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outlet")
            .field("device_id", &self.device_id)
            .field("power_on", &self.power_on())
            .finish()
    }
}

/// Builder for [`Outlet`].
///
/// Device identity and the three collaborator seams are required; the
/// accessory info defaults to an identity-derived block and the queue
/// capacity to the firmware default.
#[derive(Default)]
pub struct OutletBuilder {
    device_id: Option<DeviceId>,
    info: Option<AccessoryInfo>,
    outputs: Option<Arc<dyn OutputDriver>>,
    remote: Option<Arc<dyn RemoteAccessory>>,
    store: Option<Arc<dyn StateStore>>,
    queue_capacity: Option<usize>,
}

impl OutletBuilder {
    /// Sets the device identity.
    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    /// Sets the advertised accessory identification block.
    #[must_use]
    pub fn accessory_info(mut self, info: AccessoryInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Sets the physical output driver.
    #[must_use]
    pub fn outputs(mut self, outputs: Arc<dyn OutputDriver>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    /// Sets the remote accessory notifier.
    #[must_use]
    pub fn remote(mut self, remote: Arc<dyn RemoteAccessory>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the persisted state store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the status queue capacity.
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Wires the core and performs the startup re-drive.
    ///
    /// The persisted value is restored (default off when no record exists;
    /// a failing load is logged and falls back to off) and applied through
    /// the full sink fan-out, so the physical outputs match the stored
    /// state immediately after boot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if the device identity or any
    /// collaborator seam is missing.
    pub fn build(self) -> Result<Outlet, ConfigError> {
        let device_id = self.device_id.ok_or(ConfigError::MissingField("device_id"))?;
        let outputs = self.outputs.ok_or(ConfigError::MissingField("outputs"))?;
        let remote = self.remote.ok_or(ConfigError::MissingField("remote"))?;
        let store = self.store.ok_or(ConfigError::MissingField("store"))?;

        let queue = match self.queue_capacity {
            Some(capacity) => StatusQueue::with_capacity(capacity),
            None => StatusQueue::new(),
        };

        let initial = match store.load(POWER_STATE_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore power state, defaulting to off");
                false
            }
        };

        let authority = Arc::new(StateAuthority::new(
            outputs,
            remote,
            store,
            Arc::new(queue),
        ));
        authority.apply(initial);

        let info = self
            .info
            .unwrap_or_else(|| AccessoryInfo::for_device(device_id));

        tracing::info!(
            device_id = %device_id,
            power_on = initial,
            "outlet core initialized"
        );

        Ok(Outlet {
            device_id,
            info,
            authority,
        })
    }
}

impl std::fmt::Debug for OutletBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutletBuilder")
            .field("device_id", &self.device_id)
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parking_lot::Mutex;

    use crate::error::StoreError;
    use crate::io::OutputRole;

    #[derive(Default)]
    struct RecordingOutputs {
        writes: Mutex<Vec<(OutputRole, bool)>>,
    }

    impl OutputDriver for RecordingOutputs {
        fn set_output(&self, role: OutputRole, level: bool) {
            self.writes.lock().push((role, level));
        }
    }

    #[derive(Default)]
    struct RecordingRemote {
        notifications: Mutex<Vec<bool>>,
    }

    impl RemoteAccessory for RecordingRemote {
        fn notify(&self, power_on: bool) {
            self.notifications.lock().push(power_on);
        }
    }

    struct MemoryStore {
        value: Mutex<Option<bool>>,
        fail_loads: bool,
    }

    impl MemoryStore {
        fn empty() -> Self {
            Self {
                value: Mutex::new(None),
                fail_loads: false,
            }
        }

        fn with_value(value: bool) -> Self {
            Self {
                value: Mutex::new(Some(value)),
                fail_loads: false,
            }
        }

        fn failing() -> Self {
            Self {
                value: Mutex::new(None),
                fail_loads: true,
            }
        }
    }

    impl StateStore for MemoryStore {
        fn load(&self, key: &str) -> Result<Option<bool>, StoreError> {
            if self.fail_loads {
                return Err(StoreError::Read {
                    key: key.to_string(),
                    message: "simulated failure".to_string(),
                });
            }
            Ok(*self.value.lock())
        }

        fn store(&self, _key: &str, value: bool) -> Result<(), StoreError> {
            *self.value.lock() = Some(value);
            Ok(())
        }
    }

    fn device_id() -> DeviceId {
        DeviceId::from_hardware_address([0, 0, 0, 0x12, 0x34, 0x56])
    }

    fn build_outlet(store: MemoryStore) -> (Outlet, Arc<RecordingOutputs>, Arc<RecordingRemote>) {
        let outputs = Arc::new(RecordingOutputs::default());
        let remote = Arc::new(RecordingRemote::default());
        let outlet = Outlet::builder()
            .device_id(device_id())
            .outputs(Arc::clone(&outputs) as Arc<dyn OutputDriver>)
            .remote(Arc::clone(&remote) as Arc<dyn RemoteAccessory>)
            .store(Arc::new(store))
            .build()
            .unwrap();
        (outlet, outputs, remote)
    }

    #[test]
    fn build_requires_all_collaborators() {
        let result = Outlet::builder().build();
        assert!(matches!(result, Err(ConfigError::MissingField("device_id"))));

        let result = Outlet::builder().device_id(device_id()).build();
        assert!(matches!(result, Err(ConfigError::MissingField("outputs"))));
    }

    #[test]
    fn startup_redrives_persisted_state() {
        let (outlet, outputs, remote) = build_outlet(MemoryStore::with_value(true));

        assert!(outlet.power_on());
        assert_eq!(
            *outputs.writes.lock(),
            vec![(OutputRole::Indicator, true), (OutputRole::Relay, true)]
        );
        assert_eq!(*remote.notifications.lock(), vec![true]);
    }

    #[test]
    fn startup_defaults_to_off_without_record() {
        let (outlet, outputs, _) = build_outlet(MemoryStore::empty());

        assert!(!outlet.power_on());
        assert_eq!(outputs.writes.lock().last(), Some(&(OutputRole::Relay, false)));
    }

    #[test]
    fn startup_load_failure_is_not_fatal() {
        let (outlet, _, _) = build_outlet(MemoryStore::failing());
        assert!(!outlet.power_on());
    }

    #[test]
    fn button_toggles() {
        let (outlet, _, _) = build_outlet(MemoryStore::empty());

        outlet.handle_button();
        assert!(outlet.power_on());

        outlet.handle_button();
        assert!(!outlet.power_on());
    }

    #[test]
    fn characteristic_set_accepts_bool() {
        let (outlet, _, remote) = build_outlet(MemoryStore::empty());

        outlet.characteristic_set(&CharacteristicValue::Bool(true));

        assert!(outlet.characteristic_get());
        assert_eq!(*remote.notifications.lock().last().unwrap(), true);
    }

    #[test]
    fn characteristic_set_rejects_other_formats() {
        let (outlet, outputs, _) = build_outlet(MemoryStore::empty());
        let writes_after_boot = outputs.writes.lock().len();

        outlet.characteristic_set(&CharacteristicValue::Int(1));
        outlet.characteristic_set(&CharacteristicValue::String("on".to_string()));

        assert!(!outlet.power_on());
        assert_eq!(outputs.writes.lock().len(), writes_after_boot);
    }

    #[test]
    fn default_accessory_info_uses_identity() {
        let (outlet, _, _) = build_outlet(MemoryStore::empty());
        assert_eq!(outlet.accessory_info().serial_number, "ESP-123456");
        assert_eq!(outlet.accessory_info().name, "ESP-123456");
    }
}
