//! WANIPConnection / WANPPPConnection facade
//!
//! Both service templates share the actions used here, so one type drives
//! either of them in version 1 or 2.

use crate::error::{IgdError, Result};
use crate::service::{GenericService, UpnpService};
use crate::types::{
    ConnectionState, NatRsipStatus, PortMapping, Protocol, StatusInfo, MAX_LEASE_DURATION,
};
use crate::urn;
use soap_client::ActionResponse;
use std::collections::HashMap;
use std::sync::Arc;

const ONLY_PERMANENT_LEASES_SUPPORTED: u16 = 725;
const NO_SUCH_ENTRY_IN_ARRAY: u16 = 713;
const NO_SUCH_ENTRY_IN_ARRAY_V2: u16 = 714;

/// A WAN IP or PPP connection service of a gateway
#[derive(Debug)]
pub struct WanConnectionService {
    service: GenericService,
}

impl WanConnectionService {
    /// Wrap `service` when its type is a supported connection service
    pub fn new(service: Arc<dyn UpnpService>) -> Option<Self> {
        Self::is_supported(service.service_type()).then(|| Self {
            service: GenericService::new(service),
        })
    }

    pub fn is_supported(service_type: &str) -> bool {
        urn::check_service_version(
            service_type,
            &[urn::WAN_IP_CONNECTION, urn::WAN_PPP_CONNECTION],
            urn::SUPPORTED_VERSIONS,
        )
    }

    pub fn id(&self) -> &str {
        self.service.id()
    }

    pub fn service_type(&self) -> &str {
        self.service.service_type()
    }

    pub fn version(&self) -> u32 {
        self.service.version()
    }

    pub fn last_upnp_error_code(&self) -> Option<u16> {
        self.service.last_upnp_error_code()
    }

    /// Create or update a port mapping
    ///
    /// On version 2 services a permanent lease is requested as the maximum
    /// lease, since those devices only accept permanent mappings from
    /// out-of-band management. A device answering error 725 gets the
    /// request again once with lease 0.
    pub fn add_port_mapping(&self, mapping: &PortMapping) -> Result<()> {
        mapping.validate()?;

        let lease = if self.version() >= 2 && mapping.lease_duration == 0 {
            MAX_LEASE_DURATION
        } else {
            mapping.lease_duration
        };

        let args = port_mapping_args(mapping, lease);
        tracing::debug!("AddPortMapping with: {}", urn::args_to_string(&args));

        match self.service.invoke("AddPortMapping", &args) {
            Ok(_) => Ok(()),
            Err(e) if e.upnp_code() == Some(ONLY_PERMANENT_LEASES_SUPPORTED) && lease != 0 => {
                tracing::warn!(
                    "AddPortMapping: gateway {} only accepts permanent leases, retrying with lease 0",
                    self.id()
                );
                let args = port_mapping_args(mapping, 0);
                self.service
                    .invoke("AddPortMapping", &args)
                    .map(|_| ())
                    .map_err(|e| self.failed("AddPortMapping", &args, e))
            }
            Err(e) => Err(self.failed("AddPortMapping", &args, e)),
        }
    }

    pub fn delete_port_mapping(
        &self,
        remote_host: Option<&str>,
        external_port: u16,
        protocol: Protocol,
    ) -> Result<()> {
        let args = [
            ("NewRemoteHost", remote_host.unwrap_or_default().to_string()),
            ("NewExternalPort", external_port.to_string()),
            ("NewProtocol", protocol.as_str().to_string()),
        ];

        self.service
            .invoke("DeletePortMapping", &args)
            .map(|_| ())
            .map_err(|e| self.failed("DeletePortMapping", &args, e))
    }

    pub fn external_ip_address(&self) -> Result<String> {
        let response = self
            .service
            .invoke("GetExternalIPAddress", &[])
            .map_err(|e| self.failed("GetExternalIPAddress", &[], e))?;

        required(&response, "NewExternalIPAddress").map(str::to_string)
    }

    pub fn nat_rsip_status(&self) -> Result<NatRsipStatus> {
        let response = self
            .service
            .invoke("GetNATRSIPStatus", &[])
            .map_err(|e| self.failed("GetNATRSIPStatus", &[], e))?;

        Ok(NatRsipStatus {
            nat_enabled: required_bool(&response, "NewNATEnabled")?,
            rsip_available: required_bool(&response, "NewRSIPAvailable")?,
        })
    }

    /// Port mapping at `index`, `None` past the last entry
    pub fn port_mapping_entry(&self, index: u16) -> Result<Option<PortMapping>> {
        let args = [("NewPortMappingIndex", index.to_string())];

        let response = match self.service.invoke("GetGenericPortMappingEntry", &args) {
            Ok(response) => response,
            Err(e)
                if matches!(
                    e.upnp_code(),
                    Some(NO_SUCH_ENTRY_IN_ARRAY | NO_SUCH_ENTRY_IN_ARRAY_V2)
                ) =>
            {
                return Ok(None);
            }
            Err(e) => return Err(self.failed("GetGenericPortMappingEntry", &args, e)),
        };

        let remote_host = response
            .string("NewRemoteHost")
            .filter(|host| !host.is_empty())
            .map(str::to_string);

        Ok(Some(PortMapping {
            remote_host,
            external_port: required_u16(&response, "NewExternalPort")?,
            protocol: required(&response, "NewProtocol")?.parse()?,
            internal_port: required_u16(&response, "NewInternalPort")?,
            internal_client: required(&response, "NewInternalClient")?.to_string(),
            enabled: required_bool(&response, "NewEnabled")?,
            description: response
                .string("NewPortMappingDescription")
                .unwrap_or_default()
                .to_string(),
            lease_duration: response.u32("NewLeaseDuration").unwrap_or(0),
        }))
    }

    /// Every port mapping, read from index 0 up to the first missing entry
    pub fn port_mappings(&self) -> Result<Vec<PortMapping>> {
        let mut mappings = Vec::new();
        for index in 0..=u16::MAX {
            match self.port_mapping_entry(index)? {
                Some(mapping) => mappings.push(mapping),
                None => break,
            }
        }
        Ok(mappings)
    }

    pub fn status_info(&self) -> Result<StatusInfo> {
        let response = self
            .service
            .invoke("GetStatusInfo", &[])
            .map_err(|e| self.failed("GetStatusInfo", &[], e))?;

        Ok(StatusInfo {
            connection_state: ConnectionState::from_wire(
                response.string("NewConnectionStatus").unwrap_or_default(),
            ),
            last_error: response
                .string("NewLastConnectionError")
                .unwrap_or_default()
                .to_string(),
            uptime: response.u32("NewUptime").unwrap_or(0),
        })
    }

    pub fn set_state_variables(&self, variables: &HashMap<String, String>) {
        self.service.set_state_variables(variables);
    }

    pub fn dispose(&self) {
        self.service.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.service.is_disposed()
    }

    /// Log a failed action and record its UPnP code
    fn failed(&self, action: &str, args: &[(&str, String)], error: IgdError) -> IgdError {
        if let Some(code) = error.upnp_code() {
            self.service.record_upnp_error(code);
        }
        tracing::warn!("Invocation of '{}' on {} failed: {}", action, self.id(), error);
        if !args.is_empty() {
            tracing::warn!("Args: {}", urn::args_to_string(args));
        }
        error
    }
}

fn port_mapping_args(mapping: &PortMapping, lease: u32) -> [(&'static str, String); 8] {
    [
        ("NewRemoteHost", mapping.remote_host.clone().unwrap_or_default()),
        ("NewExternalPort", mapping.external_port.to_string()),
        ("NewProtocol", mapping.protocol.as_str().to_string()),
        ("NewInternalPort", mapping.internal_port.to_string()),
        ("NewInternalClient", mapping.internal_client.clone()),
        ("NewEnabled", if mapping.enabled { "1" } else { "0" }.to_string()),
        ("NewPortMappingDescription", mapping.description.clone()),
        ("NewLeaseDuration", lease.to_string()),
    ]
}

fn required<'a>(response: &'a ActionResponse, name: &str) -> Result<&'a str> {
    response
        .string(name)
        .ok_or_else(|| IgdError::ParseError(format!("Missing output argument {}", name)))
}

fn required_u16(response: &ActionResponse, name: &str) -> Result<u16> {
    response
        .u16(name)
        .ok_or_else(|| IgdError::ParseError(format!("Invalid output argument {}", name)))
}

fn required_bool(response: &ActionResponse, name: &str) -> Result<bool> {
    response
        .bool(name)
        .ok_or_else(|| IgdError::ParseError(format!("Invalid output argument {}", name)))
}
