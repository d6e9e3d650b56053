//! Typed UPnP Internet Gateway Device layer
//!
//! Discovered UPnP devices are bound into a topology of
//! [`InternetGatewayDevice`]s, each owning the WAN connection devices found
//! under its WAN devices and exposing a default connection. Connection
//! services drive the port mapping and status actions of a router.
//!
//! ```rust,ignore
//! use upnp_igd::{DeviceManager, PortMapping, Protocol};
//!
//! let manager = DeviceManager::new();
//! let gateways = manager.discover(Default::default(), &Default::default());
//! let service = gateways[0]
//!     .default_wan_connection_device()
//!     .and_then(|wcd| wcd.default_service())
//!     .unwrap();
//! service.add_port_mapping(
//!     &PortMapping::new(Protocol::Tcp, 8080, "192.168.1.10").with_description("web"),
//! )?;
//! ```

pub mod device;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod manager;
pub mod service;
pub mod types;
pub mod urn;
pub mod wan_connection_device;
pub mod wan_connection_service;
pub mod wan_device;

pub use device::GenericDevice;
pub use error::{IgdError, Result};
pub use gateway::InternetGatewayDevice;
pub use manager::{BoundDevice, DeviceManager, GatewayEvent};
pub use service::{GenericService, SoapService, UpnpService};
pub use types::{ConnectionState, NatRsipStatus, PortMapping, Protocol, StatusInfo};
pub use wan_connection_device::WanConnectionDevice;
pub use wan_connection_service::WanConnectionService;
pub use wan_device::WanDevice;

// Transport and discovery types used in this crate's signatures
pub use soap_client::{ActionResponse, SoapClient, SoapConfig, SoapError};
pub use upnp_discovery::{DiscoveredDevice, DiscoveredService, DiscoveryConfig};
