//! Device registry.
//!
//! The [`DeviceRegistry`] maps short names such as `"aqt.sim"` to device
//! factories, so hosts can construct devices from configuration without
//! naming concrete adapter types.

use marmot_ir::Wires;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::DeviceConfig;
use crate::device::Device;
use crate::error::{HalError, HalResult};

/// Factory function type for registered devices.
type DeviceFactory = Box<dyn Fn(Wires, DeviceConfig) -> HalResult<Box<dyn Device>> + Send + Sync>;

/// Central registry for device factories.
pub struct DeviceRegistry {
    factories: FxHashMap<String, DeviceFactory>,
}

impl DeviceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a device factory under `name`.
    ///
    /// A later registration with the same name replaces the earlier one.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(Wires, DeviceConfig) -> HalResult<Box<dyn Device>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering device factory: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a device by name.
    pub fn create(
        &self,
        name: &str,
        wires: Wires,
        config: DeviceConfig,
    ) -> HalResult<Box<dyn Device>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            HalError::DeviceUnavailable(format!(
                "No device registered with name '{name}'. Available: {}",
                self.available_devices().join(", ")
            ))
        })?;
        factory(wires, config)
    }

    /// List all registered device names, sorted.
    pub fn available_devices(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a device is registered by name.
    pub fn has_device(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
