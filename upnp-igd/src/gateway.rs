//! Internet Gateway Device aggregate

use crate::device::GenericDevice;
use crate::error::{IgdError, Result};
use crate::urn;
use crate::wan_connection_device::WanConnectionDevice;
use crate::wan_device::WanDevice;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct GatewayState {
    wan_device_udns: Vec<String>,
    connection_devices: Vec<Arc<WanConnectionDevice>>,
    default_connection_device: Option<Arc<WanConnectionDevice>>,
}

/// A gateway with the WAN devices and connection devices bound under it
///
/// Removing any sub-device disposes the whole gateway; it is rebuilt when
/// the device tree is bound again.
#[derive(Debug)]
pub struct InternetGatewayDevice {
    udn: String,
    friendly_name: String,
    manufacturer: String,
    state: Mutex<GatewayState>,
    registered: AtomicBool,
}

impl InternetGatewayDevice {
    pub fn is_supported(device_type: &str) -> bool {
        urn::is_supported_device(
            urn::INTERNET_GATEWAY_DEVICE,
            urn::SUPPORTED_VERSIONS,
            device_type,
        )
    }

    pub fn new(device: GenericDevice) -> Result<Self> {
        if !Self::is_supported(&device.device_type) {
            return Err(IgdError::UnsupportedDevice(device.device_type));
        }
        Ok(Self {
            udn: device.udn,
            friendly_name: device.friendly_name,
            manufacturer: device.manufacturer,
            state: Mutex::new(GatewayState::default()),
            registered: AtomicBool::new(false),
        })
    }

    pub fn udn(&self) -> &str {
        &self.udn
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    pub(crate) fn set_registered(&self) {
        self.registered.store(true, Ordering::SeqCst);
    }

    /// Record a WAN device whose parent is this gateway
    pub fn add_wan_device(&self, wan_device: &WanDevice) -> bool {
        if wan_device.parent_udn() != Some(self.udn.as_str()) {
            return false;
        }
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if !state.wan_device_udns.iter().any(|udn| udn == wan_device.udn()) {
            state.wan_device_udns.push(wan_device.udn().to_string());
        }
        tracing::debug!("IGD '{}' got WANDevice '{}'", self.udn, wan_device.udn());
        true
    }

    /// Whether `device` hangs under one of this gateway's WAN devices
    pub fn owns_connection_device(&self, device: &WanConnectionDevice) -> bool {
        device
            .parent_udn()
            .is_some_and(|parent_udn| self.contains_wan_device(parent_udn))
    }

    /// Attach a connection device whose parent is one of this gateway's WAN devices
    ///
    /// The device becomes the default when there is none yet or the
    /// current default is not connected. The current default's status is
    /// queried without holding the gateway state lock.
    pub fn add_wan_connection_device(&self, device: Arc<WanConnectionDevice>) -> bool {
        let current = {
            let Ok(mut state) = self.state.lock() else {
                return false;
            };
            let Some(parent_udn) = device.parent_udn() else {
                return false;
            };
            if !state.wan_device_udns.iter().any(|udn| udn == parent_udn) {
                return false;
            }

            tracing::debug!("IGD '{}' got WANConnectionDevice '{}'", self.udn, device.udn());
            state.connection_devices.retain(|d| d.udn() != device.udn());
            state.connection_devices.push(Arc::clone(&device));
            state.default_connection_device.clone()
        };

        let replace_default = current.as_ref().map_or(true, |current| !current.is_connected());
        if !replace_default {
            return true;
        }

        if let Ok(mut state) = self.state.lock() {
            // Another default may have been chosen, or the gateway disposed, meanwhile
            let unchanged = match (&state.default_connection_device, &current) {
                (Some(now), Some(before)) => Arc::ptr_eq(now, before),
                (None, None) => true,
                _ => false,
            };
            let attached = state.connection_devices.iter().any(|d| Arc::ptr_eq(d, &device));
            if unchanged && attached {
                tracing::debug!(
                    "IGD '{}' got a DEFAULT WANConnectionDevice '{}'",
                    self.udn,
                    device.udn()
                );
                state.default_connection_device = Some(device);
            }
        }
        true
    }

    /// Remove a WAN device; on success the gateway is disposed
    pub fn remove_wan_device(&self, udn: &str) -> bool {
        let removed = match self.state.lock() {
            Ok(mut state) => {
                let before = state.wan_device_udns.len();
                state.wan_device_udns.retain(|u| u != udn);
                state.wan_device_udns.len() != before
            }
            Err(_) => false,
        };
        if removed {
            self.dispose();
        }
        removed
    }

    /// Remove a connection device; on success it and the gateway are disposed
    pub fn remove_wan_connection_device(&self, udn: &str) -> bool {
        let removed = match self.state.lock() {
            Ok(mut state) => state
                .connection_devices
                .iter()
                .position(|d| d.udn() == udn)
                .map(|index| state.connection_devices.remove(index)),
            Err(_) => None,
        };
        match removed {
            Some(device) => {
                device.dispose();
                self.dispose();
                true
            }
            None => false,
        }
    }

    pub fn contains_wan_device(&self, udn: &str) -> bool {
        self.state
            .lock()
            .map(|state| state.wan_device_udns.iter().any(|u| u == udn))
            .unwrap_or(false)
    }

    pub fn wan_connection_device(&self, udn: &str) -> Option<Arc<WanConnectionDevice>> {
        let state = self.state.lock().ok()?;
        state.connection_devices.iter().find(|d| d.udn() == udn).cloned()
    }

    pub fn available_wan_connection_devices(&self) -> Vec<Arc<WanConnectionDevice>> {
        self.state
            .lock()
            .map(|state| state.connection_devices.clone())
            .unwrap_or_default()
    }

    pub fn default_wan_connection_device(&self) -> Option<Arc<WanConnectionDevice>> {
        self.state.lock().ok()?.default_connection_device.clone()
    }

    /// Unregister and release every sub-device
    pub fn dispose(&self) {
        self.registered.store(false, Ordering::SeqCst);
        if let Ok(mut state) = self.state.lock() {
            state.wan_device_udns.clear();
            for device in state.connection_devices.drain(..) {
                device.dispose();
            }
            state.default_connection_device = None;
        }
        tracing::debug!("IGD '{}' disposed", self.udn);
    }
}
