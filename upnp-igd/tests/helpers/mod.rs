//! Scripted UPnP services for topology and action tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use upnp_igd::{ActionResponse, GenericDevice, SoapError, UpnpService};

pub const IGD_V1: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice:1";
pub const WAN_DEVICE_V1: &str = "urn:schemas-upnp-org:device:WANDevice:1";
pub const WCD_V1: &str = "urn:schemas-upnp-org:device:WANConnectionDevice:1";
pub const WCD_V2: &str = "urn:schemas-upnp-org:device:WANConnectionDevice:2";
pub const WAN_IP_V1: &str = "urn:schemas-upnp-org:service:WANIPConnection:1";
pub const WAN_IP_V2: &str = "urn:schemas-upnp-org:service:WANIPConnection:2";
pub const WAN_PPP_V1: &str = "urn:schemas-upnp-org:service:WANPPPConnection:1";

/// An action call seen by a `FakeService`
#[derive(Debug, Clone)]
pub struct Call {
    pub action: String,
    pub args: HashMap<String, String>,
}

/// In-memory connection service
///
/// Answers the WAN connection actions from its own state. Faults queued
/// with `fail_next` are returned first, one per call of that action.
pub struct FakeService {
    id: String,
    service_type: String,
    connection_status: Mutex<String>,
    status_delay: Mutex<Duration>,
    entries: Mutex<Vec<Vec<(&'static str, String)>>>,
    faults: Mutex<HashMap<String, VecDeque<u16>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeService {
    pub fn new(id: &str, service_type: &str, connection_status: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            service_type: service_type.to_string(),
            connection_status: Mutex::new(connection_status.to_string()),
            status_delay: Mutex::new(Duration::ZERO),
            entries: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn connected(id: &str, service_type: &str) -> Arc<Self> {
        Self::new(id, service_type, "Connected")
    }

    pub fn set_connection_status(&self, status: &str) {
        *self.connection_status.lock().unwrap() = status.to_string();
    }

    /// Make every later `GetStatusInfo` answer only after `delay`
    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub fn fail_next(&self, action: &str, code: u16) {
        self.faults
            .lock()
            .unwrap()
            .entry(action.to_string())
            .or_default()
            .push_back(code);
    }

    pub fn push_entry(&self, external_port: u16, protocol: &str, internal_client: &str) {
        self.entries.lock().unwrap().push(vec![
            ("NewRemoteHost", String::new()),
            ("NewExternalPort", external_port.to_string()),
            ("NewProtocol", protocol.to_string()),
            ("NewInternalPort", external_port.to_string()),
            ("NewInternalClient", internal_client.to_string()),
            ("NewEnabled", "1".to_string()),
            ("NewPortMappingDescription", format!("mapping {}", external_port)),
            ("NewLeaseDuration", "0".to_string()),
        ]);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, action: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.action == action).collect()
    }
}

impl UpnpService for FakeService {
    fn id(&self) -> &str {
        &self.id
    }

    fn service_type(&self) -> &str {
        &self.service_type
    }

    fn invoke(&self, action: &str, args: &[(&str, String)]) -> Result<ActionResponse, SoapError> {
        self.calls.lock().unwrap().push(Call {
            action: action.to_string(),
            args: args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        });

        if let Some(code) = self
            .faults
            .lock()
            .unwrap()
            .get_mut(action)
            .and_then(VecDeque::pop_front)
        {
            return Err(SoapError::Fault {
                code,
                description: format!("scripted fault {}", code),
            });
        }

        match action {
            "GetStatusInfo" => {
                let delay = *self.status_delay.lock().unwrap();
                thread::sleep(delay);
                Ok([
                    ("NewConnectionStatus", self.connection_status.lock().unwrap().clone()),
                    ("NewLastConnectionError", "ERROR_NONE".to_string()),
                    ("NewUptime", "42".to_string()),
                ]
                .into_iter()
                .collect())
            }
            "GetExternalIPAddress" => {
                Ok([("NewExternalIPAddress", "203.0.113.7")].into_iter().collect())
            }
            "GetNATRSIPStatus" => Ok([("NewNATEnabled", "1"), ("NewRSIPAvailable", "0")]
                .into_iter()
                .collect()),
            "GetGenericPortMappingEntry" => {
                let index: usize = args
                    .iter()
                    .find(|(k, _)| *k == "NewPortMappingIndex")
                    .and_then(|(_, v)| v.parse().ok())
                    .unwrap_or(usize::MAX);
                match self.entries.lock().unwrap().get(index) {
                    Some(entry) => Ok(entry.clone().into_iter().collect()),
                    None => Err(SoapError::Fault {
                        code: 713,
                        description: "SpecifiedArrayIndexInvalid".to_string(),
                    }),
                }
            }
            "AddPortMapping" | "DeletePortMapping" => Ok(ActionResponse::default()),
            other => Err(SoapError::Fault {
                code: 401,
                description: format!("Invalid Action {}", other),
            }),
        }
    }
}

pub fn gateway(udn: &str) -> GenericDevice {
    GenericDevice::new(udn, IGD_V1).with_friendly_name("Test Router")
}

pub fn wan_device(udn: &str, parent: &str) -> GenericDevice {
    GenericDevice::new(udn, WAN_DEVICE_V1).with_parent(parent)
}

pub fn connection_device(udn: &str, parent: &str, services: &[Arc<FakeService>]) -> GenericDevice {
    services.iter().fold(
        GenericDevice::new(udn, WCD_V1).with_parent(parent),
        |device, service| device.with_service(Arc::clone(service) as Arc<dyn UpnpService>),
    )
}
