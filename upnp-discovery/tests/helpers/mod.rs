//! Test helpers for fixture-based integration tests

use std::fs;
use std::path::PathBuf;

/// A device description fixture served from a given IP
#[derive(Debug, Clone)]
pub struct DeviceFixture {
    pub name: String,
    pub ip: String,
    pub xml_content: String,
}

impl DeviceFixture {
    /// Load a fixture from the fixtures directory
    pub fn load(filename: &str, ip: &str) -> Self {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("tests/fixtures");
        path.push(filename);

        let xml_content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e));

        Self {
            name: filename.to_string(),
            ip: ip.to_string(),
            xml_content,
        }
    }

    /// SSDP location URL for this device
    pub fn location_url(&self) -> String {
        format!("http://{}:5000/rootDesc.xml", self.ip)
    }

    /// Mock SSDP response for this device
    #[allow(dead_code)]
    pub fn ssdp_response(&self, uuid: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\n\
             CACHE-CONTROL: max-age=120\r\n\
             EXT:\r\n\
             LOCATION: {}\r\n\
             SERVER: OpenWRT/OpenWrt UPnP/1.1 MiniUPnPd/2.3.3\r\n\
             ST: urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\
             USN: uuid:{}::urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\r\n",
            self.location_url(),
            uuid
        )
    }
}

/// Collection of fixtures for a scenario
pub struct FixtureSet {
    pub devices: Vec<DeviceFixture>,
}

impl FixtureSet {
    pub fn new(devices: Vec<DeviceFixture>) -> Self {
        Self { devices }
    }

    pub fn single_v1_gateway() -> Self {
        Self::new(vec![DeviceFixture::load("igd_v1_device.xml", "192.168.1.1")])
    }

    pub fn both_gateway_versions() -> Self {
        Self::new(vec![
            DeviceFixture::load("igd_v1_device.xml", "192.168.1.1"),
            DeviceFixture::load("igd_v2_device.xml", "192.168.0.1"),
        ])
    }

    /// Gateways plus a media server that must be filtered out
    pub fn mixed_devices() -> Self {
        Self::new(vec![
            DeviceFixture::load("igd_v1_device.xml", "192.168.1.1"),
            DeviceFixture::load("non_gateway_device.xml", "192.168.1.20"),
            DeviceFixture::load("igd_v2_device.xml", "192.168.0.1"),
        ])
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fixture() {
        let fixture = DeviceFixture::load("igd_v1_device.xml", "192.168.1.1");
        assert!(fixture.xml_content.contains("<?xml"));
        assert!(fixture.xml_content.contains("InternetGatewayDevice"));
    }

    #[test]
    fn test_ssdp_response() {
        let fixture = DeviceFixture::load("igd_v1_device.xml", "192.168.1.1");
        let response = fixture.ssdp_response("abc");
        assert!(response.contains("LOCATION: http://192.168.1.1:5000/rootDesc.xml"));
        assert!(response.contains("USN: uuid:abc::"));
    }
}
