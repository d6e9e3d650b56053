//! Generic device record fed to the topology manager

use crate::service::{SoapService, UpnpService};
use crate::urn;
use soap_client::SoapClient;
use std::fmt;
use std::sync::Arc;
use upnp_discovery::DiscoveredDevice;

/// A UPnP device as seen by the topology manager
///
/// Built from a discovery record, or directly by platforms that run their
/// own discovery.
#[derive(Clone)]
pub struct GenericDevice {
    pub udn: String,
    pub parent_udn: Option<String>,
    pub friendly_name: String,
    pub manufacturer: String,
    pub device_type: String,
    pub services: Vec<Arc<dyn UpnpService>>,
}

impl GenericDevice {
    pub fn new(udn: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            udn: udn.into(),
            parent_udn: None,
            friendly_name: String::new(),
            manufacturer: String::new(),
            device_type: device_type.into(),
            services: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_udn: impl Into<String>) -> Self {
        self.parent_udn = Some(parent_udn.into());
        self
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = friendly_name.into();
        self
    }

    pub fn with_service(mut self, service: Arc<dyn UpnpService>) -> Self {
        self.services.push(service);
        self
    }

    /// Wrap a discovery record, every service invoked through `client`
    pub fn from_discovered(device: DiscoveredDevice, client: &SoapClient) -> Self {
        let services = device
            .services
            .iter()
            .map(|s| Arc::new(SoapService::from_discovered(s, client.clone())) as Arc<dyn UpnpService>)
            .collect();

        Self {
            udn: device.udn,
            parent_udn: device.parent_udn,
            friendly_name: device.friendly_name,
            manufacturer: device.manufacturer,
            device_type: device.device_type,
            services,
        }
    }

    /// Version suffix of the device type
    pub fn version(&self) -> u32 {
        urn::type_version(&self.device_type)
    }

    pub fn service(&self, service_id: &str) -> Option<&Arc<dyn UpnpService>> {
        self.services.iter().find(|s| s.id() == service_id)
    }
}

impl fmt::Debug for GenericDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericDevice")
            .field("udn", &self.udn)
            .field("parent_udn", &self.parent_udn)
            .field("friendly_name", &self.friendly_name)
            .field("device_type", &self.device_type)
            .field("services", &self.services.iter().map(|s| s.id()).collect::<Vec<_>>())
            .finish()
    }
}
