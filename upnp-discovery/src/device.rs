//! Device description parsing and flattening.
//!
//! A UPnP root device embeds sub-devices through nested `deviceList`
//! elements. For an Internet Gateway Device the tree is
//! `InternetGatewayDevice > WANDevice > WANConnectionDevice`. This module
//! parses the description document and flattens the tree into one
//! [`DiscoveredDevice`] per device, each carrying its parent UDN.

use crate::error::{DiscoveryError, Result};
use crate::{DiscoveredDevice, DiscoveredService};
use serde::Deserialize;
use url::Url;

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
pub struct Root {
    #[serde(rename = "URLBase")]
    pub url_base: Option<String>,
    pub device: DeviceDescription,
}

/// Device description parsed from XML.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    pub friendly_name: String,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    #[serde(rename = "UDN")]
    pub udn: String,
    pub service_list: Option<ServiceList>,
    pub device_list: Option<DeviceList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceDescription>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescription {
    pub service_type: String,
    pub service_id: String,
    #[serde(rename = "controlURL")]
    pub control_url: String,
    #[serde(rename = "eventSubURL")]
    pub event_sub_url: Option<String>,
}

impl Root {
    /// Parse a device description document.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or missing required fields.
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))
    }

    /// Flatten the device tree in document order.
    ///
    /// Relative service URLs are resolved against `URLBase` when the
    /// document has one, else against `location`.
    pub fn flatten(&self, location: &str) -> Result<Vec<DiscoveredDevice>> {
        let base = self.url_base.as_deref().unwrap_or(location);
        let base = Url::parse(base.trim())
            .map_err(|e| DiscoveryError::ParseError(format!("Invalid base URL '{}': {}", base, e)))?;

        let mut devices = Vec::new();
        self.device.collect_into(None, &base, location, &mut devices)?;
        Ok(devices)
    }

    /// Whether the root device is an Internet Gateway Device (any version)
    pub fn is_gateway(&self) -> bool {
        self.device
            .device_type
            .starts_with("urn:schemas-upnp-org:device:InternetGatewayDevice:")
    }
}

impl DeviceDescription {
    fn collect_into(
        &self,
        parent_udn: Option<&str>,
        base: &Url,
        location: &str,
        out: &mut Vec<DiscoveredDevice>,
    ) -> Result<()> {
        let services = self
            .service_list
            .iter()
            .flat_map(|list| list.services.iter())
            .map(|service| service.resolve(base))
            .collect::<Result<Vec<_>>>()?;

        out.push(DiscoveredDevice {
            udn: self.udn.trim().to_string(),
            parent_udn: parent_udn.map(str::to_string),
            friendly_name: self.friendly_name.clone(),
            manufacturer: self.manufacturer.clone().unwrap_or_default(),
            model_name: self.model_name.clone(),
            device_type: self.device_type.trim().to_string(),
            location: location.to_string(),
            services,
        });

        for child in self.device_list.iter().flat_map(|list| list.devices.iter()) {
            child.collect_into(Some(self.udn.trim()), base, location, out)?;
        }
        Ok(())
    }
}

impl ServiceDescription {
    fn resolve(&self, base: &Url) -> Result<DiscoveredService> {
        let join = |path: &str| {
            base.join(path.trim())
                .map(String::from)
                .map_err(|e| DiscoveryError::ParseError(format!("Invalid service URL '{}': {}", path, e)))
        };

        Ok(DiscoveredService {
            service_type: self.service_type.trim().to_string(),
            service_id: self.service_id.trim().to_string(),
            control_url: join(&self.control_url)?,
            event_sub_url: self.event_sub_url.as_deref().map(join).transpose()?,
        })
    }
}

/// Extract the host portion of a URL.
///
/// # Returns
///
/// The host of the URL, or `None` if the URL is malformed.
pub fn extract_ip_from_url(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATEWAY_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>Home Router</friendlyName>
    <manufacturer>Acme</manufacturer>
    <UDN>uuid:igd-1</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:Layer3Forwarding:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:L3Forwarding1</serviceId>
        <controlURL>/ctl/L3F</controlURL>
        <eventSubURL>/evt/L3F</eventSubURL>
        <SCPDURL>/L3F.xml</SCPDURL>
      </service>
    </serviceList>
    <deviceList>
      <device>
        <deviceType>urn:schemas-upnp-org:device:WANDevice:1</deviceType>
        <friendlyName>WAN Device</friendlyName>
        <UDN>uuid:wan-1</UDN>
        <deviceList>
          <device>
            <deviceType>urn:schemas-upnp-org:device:WANConnectionDevice:1</deviceType>
            <friendlyName>WAN Connection Device</friendlyName>
            <UDN>uuid:wcd-1</UDN>
            <serviceList>
              <service>
                <serviceType>urn:schemas-upnp-org:service:WANIPConnection:1</serviceType>
                <serviceId>urn:upnp-org:serviceId:WANIPConn1</serviceId>
                <controlURL>ctl/IPConn</controlURL>
                <eventSubURL>/evt/IPConn</eventSubURL>
                <SCPDURL>/WANIPCn.xml</SCPDURL>
              </service>
            </serviceList>
          </device>
        </deviceList>
      </device>
    </deviceList>
  </device>
</root>"#;

    #[test]
    fn test_flatten_keeps_document_order_and_parents() {
        let root = Root::from_xml(GATEWAY_XML).unwrap();
        assert!(root.is_gateway());

        let devices = root.flatten("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        let udns: Vec<_> = devices.iter().map(|d| d.udn.as_str()).collect();
        assert_eq!(udns, ["uuid:igd-1", "uuid:wan-1", "uuid:wcd-1"]);

        assert_eq!(devices[0].parent_udn, None);
        assert_eq!(devices[1].parent_udn.as_deref(), Some("uuid:igd-1"));
        assert_eq!(devices[2].parent_udn.as_deref(), Some("uuid:wan-1"));
        assert_eq!(devices[0].manufacturer, "Acme");
        assert_eq!(devices[1].manufacturer, "");
    }

    #[test]
    fn test_service_urls_resolve_against_location() {
        let root = Root::from_xml(GATEWAY_XML).unwrap();
        let devices = root.flatten("http://192.168.1.1:5000/desc/rootDesc.xml").unwrap();

        let l3f = &devices[0].services[0];
        assert_eq!(l3f.control_url, "http://192.168.1.1:5000/ctl/L3F");

        let ip_conn = &devices[2].services[0];
        assert_eq!(ip_conn.service_type, "urn:schemas-upnp-org:service:WANIPConnection:1");
        assert_eq!(ip_conn.control_url, "http://192.168.1.1:5000/desc/ctl/IPConn");
        assert_eq!(ip_conn.event_sub_url.as_deref(), Some("http://192.168.1.1:5000/evt/IPConn"));
    }

    #[test]
    fn test_url_base_takes_precedence() {
        let xml = GATEWAY_XML.replace(
            "<specVersion>",
            "<URLBase>http://10.0.0.1:80/</URLBase><specVersion>",
        );
        let root = Root::from_xml(&xml).unwrap();
        let devices = root.flatten("http://192.168.1.1:5000/rootDesc.xml").unwrap();
        assert_eq!(devices[0].services[0].control_url, "http://10.0.0.1/ctl/L3F");
    }

    #[test]
    fn test_non_gateway_root() {
        let xml = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaRenderer:1</deviceType>
    <friendlyName>Speaker</friendlyName>
    <UDN>uuid:renderer</UDN>
  </device>
</root>"#;
        let root = Root::from_xml(xml).unwrap();
        assert!(!root.is_gateway());
        let devices = root.flatten("http://192.168.1.20:1400/xml/device_description.xml").unwrap();
        assert_eq!(devices.len(), 1);
        assert!(devices[0].services.is_empty());
    }

    #[test]
    fn test_extract_ip_from_url() {
        assert_eq!(
            extract_ip_from_url("http://192.168.1.1:49152/rootDesc.xml"),
            Some("192.168.1.1".to_string())
        );
        assert_eq!(extract_ip_from_url("invalid-url"), None);
    }
}
