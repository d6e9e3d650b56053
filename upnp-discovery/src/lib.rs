//! UPnP Internet Gateway Device discovery
//!
//! This crate finds Internet Gateway Devices (IGD v1 and v2) on the local
//! network with SSDP, fetches their device descriptions and flattens each
//! device tree into a list of [`DiscoveredDevice`] records. The records
//! carry the parent UDN of every embedded device so that a topology can be
//! rebuilt regardless of the order devices are processed in.
//!
//! # Quick Start
//!
//! ```no_run
//! use upnp_discovery::get;
//!
//! for device in get() {
//!     println!("{} {} ({})", device.udn, device.friendly_name, device.device_type);
//! }
//! ```
//!
//! # Iterator-based Discovery
//!
//! ```no_run
//! use upnp_discovery::{get_iter, DeviceEvent};
//!
//! for event in get_iter() {
//!     match event {
//!         DeviceEvent::Found(device) => {
//!             println!("Found: {}", device.friendly_name);
//!         }
//!     }
//! }
//! ```

mod error;
mod ssdp;
pub mod device;
mod discovery;

pub use discovery::{fetch_description, DiscoveryIterator};
pub use error::{DiscoveryError, Result};

use serde::Serialize;
use std::time::Duration;

/// IGD v1 search target
pub const IGD_V1: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice:1";
/// IGD v2 search target
pub const IGD_V2: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice:2";

/// A device found in a gateway's description tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredDevice {
    /// Unique device name, e.g. "uuid:824ff22b-8c7d-41c5-a131-44f534e12555"
    pub udn: String,
    /// UDN of the enclosing device, `None` for the root device
    pub parent_udn: Option<String>,
    pub friendly_name: String,
    pub manufacturer: String,
    pub model_name: Option<String>,
    /// Full device type URN, version suffix included
    pub device_type: String,
    /// Location of the description document the device was read from
    pub location: String,
    pub services: Vec<DiscoveredService>,
}

/// A service declared by a discovered device, with absolute URLs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveredService {
    pub service_type: String,
    pub service_id: String,
    pub control_url: String,
    pub event_sub_url: Option<String>,
}

impl DiscoveredDevice {
    /// Host of the description location
    pub fn ip_address(&self) -> Option<String> {
        device::extract_ip_from_url(&self.location)
    }
}

/// Events emitted during device discovery.
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A device of a gateway tree was found
    Found(DiscoveredDevice),
}

/// Discovery parameters.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Time to wait for SSDP responses, also used as the HTTP timeout
    pub timeout: Duration,
    /// SSDP search targets, one M-SEARCH is sent per target
    pub search_targets: Vec<String>,
    /// Maximum response delay requested from devices, in seconds
    pub mx: u8,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            search_targets: vec![IGD_V1.to_string(), IGD_V2.to_string()],
            mx: 2,
        }
    }
}

/// Discover all gateway devices with a default 3-second timeout.
pub fn get() -> Vec<DiscoveredDevice> {
    get_with_timeout(Duration::from_secs(3))
}

/// Discover all gateway devices with a custom timeout.
///
/// # Examples
///
/// ```no_run
/// use upnp_discovery::get_with_timeout;
/// use std::time::Duration;
///
/// let devices = get_with_timeout(Duration::from_secs(5));
/// println!("{} devices", devices.len());
/// ```
pub fn get_with_timeout(timeout: Duration) -> Vec<DiscoveredDevice> {
    get_iter_with_timeout(timeout)
        .filter_map(|event| match event {
            DeviceEvent::Found(device) => Some(device),
        })
        .collect()
}

/// Get a discovery iterator with a default 3-second timeout.
pub fn get_iter() -> DiscoveryIterator {
    get_iter_with_timeout(Duration::from_secs(3))
}

/// Get a discovery iterator with a custom timeout.
pub fn get_iter_with_timeout(timeout: Duration) -> DiscoveryIterator {
    get_iter_with_config(DiscoveryConfig {
        timeout,
        ..DiscoveryConfig::default()
    })
}

/// Get a discovery iterator with full control over search parameters.
///
/// If the network resources cannot be set up the failure is logged and the
/// returned iterator yields nothing.
pub fn get_iter_with_config(config: DiscoveryConfig) -> DiscoveryIterator {
    DiscoveryIterator::new(config).unwrap_or_else(|e| {
        tracing::warn!("Failed to start gateway discovery: {}", e);
        DiscoveryIterator::empty()
    })
}
