use crate::device::GenericDevice;
use crate::error::{IgdError, Result};
use crate::urn;

/// A WANDevice, kept only for its place in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WanDevice {
    udn: String,
    parent_udn: Option<String>,
    friendly_name: String,
}

impl WanDevice {
    pub fn is_supported(device_type: &str) -> bool {
        urn::is_supported_device(urn::WAN_DEVICE, urn::SUPPORTED_VERSIONS, device_type)
    }

    pub fn new(device: GenericDevice) -> Result<Self> {
        if !Self::is_supported(&device.device_type) {
            return Err(IgdError::UnsupportedDevice(device.device_type));
        }
        Ok(Self {
            udn: device.udn,
            parent_udn: device.parent_udn,
            friendly_name: device.friendly_name,
        })
    }

    pub fn udn(&self) -> &str {
        &self.udn
    }

    pub fn parent_udn(&self) -> Option<&str> {
        self.parent_udn.as_deref()
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }
}
