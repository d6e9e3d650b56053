//! Topology manager binding discovered devices into gateways
//!
//! Devices of a gateway tree may be bound in any order. WAN devices and
//! WAN connection devices whose parent is not known yet are parked as
//! unaffected and absorbed when the parent shows up.

use crate::device::GenericDevice;
use crate::error::{IgdError, Result};
use crate::gateway::InternetGatewayDevice;
use crate::wan_connection_device::WanConnectionDevice;
use crate::wan_device::WanDevice;
use soap_client::SoapClient;
use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::time::Duration;
use upnp_discovery::{DeviceEvent, DiscoveryConfig};

/// A device as kept by the manager after `bind`
#[derive(Debug, Clone)]
pub enum BoundDevice {
    Gateway(Arc<InternetGatewayDevice>),
    WanDevice(Arc<WanDevice>),
    WanConnectionDevice(Arc<WanConnectionDevice>),
    /// A device type this crate does not drive
    Unsupported(Arc<GenericDevice>),
}

impl BoundDevice {
    pub fn udn(&self) -> &str {
        match self {
            BoundDevice::Gateway(d) => d.udn(),
            BoundDevice::WanDevice(d) => d.udn(),
            BoundDevice::WanConnectionDevice(d) => d.udn(),
            BoundDevice::Unsupported(d) => &d.udn,
        }
    }
}

/// Gateway lifecycle notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Registered { udn: String, friendly_name: String },
    Unregistered { udn: String },
}

#[derive(Debug, Default)]
struct Registry {
    gateways: HashMap<String, Arc<InternetGatewayDevice>>,
    unaffected_wan_devices: Vec<Arc<WanDevice>>,
    unaffected_connection_devices: Vec<Arc<WanConnectionDevice>>,
    all_devices: HashMap<String, BoundDevice>,
}

impl Registry {
    fn absorb_unaffected_wan_devices(&mut self, gateway: &InternetGatewayDevice) {
        self.unaffected_wan_devices
            .retain(|wan| !gateway.add_wan_device(wan));
    }

    /// Take the parked connection devices that belong to `gateway`
    fn take_connection_orphans(
        &mut self,
        gateway: &InternetGatewayDevice,
    ) -> Vec<Arc<WanConnectionDevice>> {
        let parked = std::mem::take(&mut self.unaffected_connection_devices);
        let (owned, waiting): (Vec<_>, Vec<_>) = parked
            .into_iter()
            .partition(|wcd| gateway.owns_connection_device(wcd));
        self.unaffected_connection_devices = waiting;
        owned
    }

    fn park_connection_device(&mut self, wcd: Arc<WanConnectionDevice>) {
        self.unaffected_connection_devices
            .retain(|d| d.udn() != wcd.udn());
        self.unaffected_connection_devices.push(wcd);
    }
}

/// Registry of gateways built from bound UPnP devices
///
/// # Example
///
/// ```rust,ignore
/// use soap_client::SoapClient;
/// use upnp_discovery::DiscoveryConfig;
/// use upnp_igd::DeviceManager;
///
/// let manager = DeviceManager::new();
/// for gateway in manager.discover(DiscoveryConfig::default(), &SoapClient::new()) {
///     if let Some(wcd) = gateway.default_wan_connection_device() {
///         let service = wcd.default_service().unwrap();
///         println!("{}: {}", gateway.udn(), service.external_ip_address()?);
///     }
/// }
/// ```
#[derive(Debug, Default)]
pub struct DeviceManager {
    registry: RwLock<Registry>,
    subscribers: Mutex<Vec<mpsc::Sender<GatewayEvent>>>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a device into the topology
    ///
    /// # Errors
    ///
    /// `NoConnectionService` for a WANConnectionDevice without a usable
    /// connection service, `LockPoisoned` if the registry lock is poisoned.
    pub fn bind(&self, device: GenericDevice) -> Result<BoundDevice> {
        if InternetGatewayDevice::is_supported(&device.device_type) {
            self.bind_gateway(device)
        } else if WanDevice::is_supported(&device.device_type) {
            self.bind_wan_device(device)
        } else if WanConnectionDevice::is_supported(&device.device_type) {
            self.bind_connection_device(device)
        } else {
            tracing::info!(
                "A UPnP device has been discovered: '{}' ({}), but is not yet supported",
                device.friendly_name,
                device.device_type
            );
            let bound = BoundDevice::Unsupported(Arc::new(device));
            self.write_registry()?
                .all_devices
                .insert(bound.udn().to_string(), bound.clone());
            Ok(bound)
        }
    }

    fn bind_gateway(&self, device: GenericDevice) -> Result<BoundDevice> {
        let gateway = Arc::new(InternetGatewayDevice::new(device)?);

        let (replaced, orphans) = {
            let mut registry = self.write_registry()?;
            registry.absorb_unaffected_wan_devices(&gateway);
            let orphans = registry.take_connection_orphans(&gateway);
            gateway.set_registered();

            let bound = BoundDevice::Gateway(Arc::clone(&gateway));
            registry.all_devices.insert(gateway.udn().to_string(), bound);
            let replaced = registry
                .gateways
                .insert(gateway.udn().to_string(), Arc::clone(&gateway));
            (replaced, orphans)
        };
        self.attach_orphans(&gateway, orphans)?;

        if let Some(previous) = replaced {
            previous.dispose();
            self.announce(GatewayEvent::Unregistered {
                udn: previous.udn().to_string(),
            });
        }

        tracing::info!(
            "InternetGatewayDevice '{}' has been discovered ({})",
            gateway.udn(),
            gateway.friendly_name()
        );
        self.announce(GatewayEvent::Registered {
            udn: gateway.udn().to_string(),
            friendly_name: gateway.friendly_name().to_string(),
        });
        Ok(BoundDevice::Gateway(gateway))
    }

    fn bind_wan_device(&self, device: GenericDevice) -> Result<BoundDevice> {
        let wan = Arc::new(WanDevice::new(device)?);
        tracing::debug!("WANDevice '{}' has been discovered", wan.udn());

        let adopted = {
            let mut registry = self.write_registry()?;
            let parent = wan
                .parent_udn()
                .and_then(|udn| registry.gateways.get(udn))
                .cloned();

            let adopted = match parent {
                Some(gateway) if gateway.add_wan_device(&wan) => {
                    let orphans = registry.take_connection_orphans(&gateway);
                    Some((gateway, orphans))
                }
                _ => {
                    tracing::debug!("WANDevice '{}' has no parent yet", wan.udn());
                    registry.unaffected_wan_devices.retain(|w| w.udn() != wan.udn());
                    registry.unaffected_wan_devices.push(Arc::clone(&wan));
                    None
                }
            };

            registry
                .all_devices
                .insert(wan.udn().to_string(), BoundDevice::WanDevice(Arc::clone(&wan)));
            adopted
        };

        if let Some((gateway, orphans)) = adopted {
            self.attach_orphans(&gateway, orphans)?;
        }
        Ok(BoundDevice::WanDevice(wan))
    }

    fn bind_connection_device(&self, device: GenericDevice) -> Result<BoundDevice> {
        // Service status queries run with no registry lock held
        let wcd = Arc::new(WanConnectionDevice::new(device)?);
        tracing::debug!("WANConnectionDevice '{}' has been discovered", wcd.udn());

        let owner = self
            .registry
            .read()
            .map_err(|_| IgdError::LockPoisoned)?
            .gateways
            .values()
            .find(|gateway| gateway.owns_connection_device(&wcd))
            .cloned();
        let owner = owner.filter(|gateway| gateway.add_wan_connection_device(Arc::clone(&wcd)));

        let mut registry = self.write_registry()?;
        let still_registered = owner.as_ref().is_some_and(|gateway| {
            registry
                .gateways
                .get(gateway.udn())
                .is_some_and(|current| Arc::ptr_eq(current, gateway))
        });
        match owner {
            Some(gateway) if still_registered => tracing::debug!(
                "WANConnectionDevice '{}' has been bound to {}",
                wcd.udn(),
                gateway.udn()
            ),
            _ => {
                tracing::debug!("WANConnectionDevice '{}' has no parent yet", wcd.udn());
                registry.park_connection_device(Arc::clone(&wcd));
            }
        }

        let bound = BoundDevice::WanConnectionDevice(wcd);
        registry
            .all_devices
            .insert(bound.udn().to_string(), bound.clone());
        Ok(bound)
    }

    /// Remove a device from the topology
    ///
    /// Removing a gateway or any device bound under one disposes that
    /// gateway. Returns whether the UDN was known.
    pub fn unbind(&self, udn: &str) -> Result<bool> {
        let unregistered = {
            let mut registry = self.write_registry()?;
            let known = registry.all_devices.remove(udn).is_some();

            let unregistered = if let Some(gateway) = registry.gateways.remove(udn) {
                gateway.dispose();
                Some(gateway)
            } else {
                let owner = registry
                    .gateways
                    .values()
                    .find(|g| g.remove_wan_device(udn) || g.remove_wan_connection_device(udn))
                    .map(|g| g.udn().to_string());
                owner.and_then(|owner| registry.gateways.remove(&owner))
            };

            if unregistered.is_none() {
                registry.unaffected_wan_devices.retain(|d| d.udn() != udn);
                registry
                    .unaffected_connection_devices
                    .retain(|d| d.udn() != udn);
                if !known {
                    tracing::debug!("Unbind of unknown device '{}'", udn);
                }
                return Ok(known);
            }
            unregistered
        };

        if let Some(gateway) = unregistered {
            tracing::info!("InternetGatewayDevice '{}' is no longer available", gateway.udn());
            self.announce(GatewayEvent::Unregistered {
                udn: gateway.udn().to_string(),
            });
        }
        Ok(true)
    }

    /// Route evented state variables to a bound device
    pub fn notify_event(
        &self,
        device_udn: &str,
        service_id: &str,
        variables: &HashMap<String, String>,
    ) -> Result<()> {
        tracing::debug!("Events received from {}#{}", device_udn, service_id);

        let device = self
            .registry
            .read()
            .map_err(|_| IgdError::LockPoisoned)?
            .all_devices
            .get(device_udn)
            .cloned();

        match device {
            Some(BoundDevice::WanConnectionDevice(wcd)) => {
                wcd.set_state_variables(service_id, variables);
            }
            Some(other) => {
                tracing::debug!(
                    "Device '{}' does not handle events, {} variable(s) discarded",
                    other.udn(),
                    variables.len()
                );
            }
            None => tracing::debug!("Events for unknown device '{}' discarded", device_udn),
        }
        Ok(())
    }

    pub fn gateways(&self) -> Vec<Arc<InternetGatewayDevice>> {
        self.registry
            .read()
            .map(|r| r.gateways.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn gateway(&self, udn: &str) -> Option<Arc<InternetGatewayDevice>> {
        self.registry.read().ok()?.gateways.get(udn).cloned()
    }

    /// Any bound device by UDN
    pub fn device(&self, udn: &str) -> Option<BoundDevice> {
        self.registry.read().ok()?.all_devices.get(udn).cloned()
    }

    /// Devices waiting for their parent, as (WAN devices, connection devices) UDNs
    pub fn unaffected_devices(&self) -> (Vec<String>, Vec<String>) {
        self.registry
            .read()
            .map(|r| {
                (
                    r.unaffected_wan_devices.iter().map(|d| d.udn().to_string()).collect(),
                    r.unaffected_connection_devices
                        .iter()
                        .map(|d| d.udn().to_string())
                        .collect(),
                )
            })
            .unwrap_or_default()
    }

    /// Receive gateway registration events from now on
    pub fn subscribe(&self) -> mpsc::Receiver<GatewayEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Run SSDP discovery and bind every device found
    ///
    /// Bind failures are logged and skipped. Returns the registered gateways.
    pub fn discover(
        &self,
        config: DiscoveryConfig,
        client: &SoapClient,
    ) -> Vec<Arc<InternetGatewayDevice>> {
        for event in upnp_discovery::get_iter_with_config(config) {
            match event {
                DeviceEvent::Found(device) => {
                    let udn = device.udn.clone();
                    if let Err(e) = self.bind(GenericDevice::from_discovered(device, client)) {
                        tracing::warn!("Failed to bind device '{}': {}", udn, e);
                    }
                }
            }
        }
        self.gateways()
    }

    /// Fetch the description at a known location and bind its device tree
    pub fn bind_location(
        &self,
        location: &str,
        timeout: Duration,
        client: &SoapClient,
    ) -> Result<Vec<BoundDevice>> {
        upnp_discovery::fetch_description(location, timeout)?
            .into_iter()
            .map(|device| self.bind(GenericDevice::from_discovered(device, client)))
            .collect()
    }

    /// Attach parked connection devices to `gateway`, parking back any it refuses
    fn attach_orphans(
        &self,
        gateway: &InternetGatewayDevice,
        orphans: Vec<Arc<WanConnectionDevice>>,
    ) -> Result<()> {
        let refused: Vec<_> = orphans
            .into_iter()
            .filter(|wcd| !gateway.add_wan_connection_device(Arc::clone(wcd)))
            .collect();
        if !refused.is_empty() {
            let mut registry = self.write_registry()?;
            for wcd in refused {
                registry.park_connection_device(wcd);
            }
        }
        Ok(())
    }

    fn write_registry(&self) -> Result<std::sync::RwLockWriteGuard<'_, Registry>> {
        self.registry.write().map_err(|_| IgdError::LockPoisoned)
    }

    fn announce(&self, event: GatewayEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}
