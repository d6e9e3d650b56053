use crate::device::GenericDevice;
use crate::error::{IgdError, Result};
use crate::urn;
use crate::wan_connection_service::WanConnectionService;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A WANConnectionDevice and its connection services
///
/// The default service is the first one reporting `Connected` when the
/// device is bound, else the last supported one.
#[derive(Debug)]
pub struct WanConnectionDevice {
    udn: String,
    parent_udn: Option<String>,
    friendly_name: String,
    services: Vec<Arc<WanConnectionService>>,
    default_service: RwLock<Option<Arc<WanConnectionService>>>,
}

impl WanConnectionDevice {
    pub fn is_supported(device_type: &str) -> bool {
        urn::is_supported_device(urn::WAN_CONNECTION_DEVICE, urn::SUPPORTED_VERSIONS, device_type)
    }

    /// Bind a WANConnectionDevice, querying each service for its status
    ///
    /// # Errors
    ///
    /// `UnsupportedDevice` for another device type, `NoConnectionService`
    /// when no WANIPConnection or WANPPPConnection service is present.
    pub fn new(device: GenericDevice) -> Result<Self> {
        if !Self::is_supported(&device.device_type) {
            return Err(IgdError::UnsupportedDevice(device.device_type));
        }

        let services: Vec<_> = device
            .services
            .iter()
            .cloned()
            .filter_map(WanConnectionService::new)
            .map(Arc::new)
            .collect();

        let connected = services
            .iter()
            .find(|s| s.status_info().is_ok_and(|info| info.is_connected()));

        let default_service = match connected {
            Some(service) => {
                tracing::info!(
                    "WANConnectionDevice '{}': default-service={} **Connected**",
                    device.udn,
                    service.id()
                );
                Arc::clone(service)
            }
            None => match services.last() {
                Some(service) => {
                    tracing::info!(
                        "WANConnectionDevice '{}': default-service={} (NOT Connected)",
                        device.udn,
                        service.id()
                    );
                    Arc::clone(service)
                }
                None => {
                    tracing::warn!(
                        "WANConnectionDevice: no connection service on '{}' device ({})",
                        device.udn,
                        device.friendly_name
                    );
                    return Err(IgdError::NoConnectionService(device.udn));
                }
            },
        };

        Ok(Self {
            udn: device.udn,
            parent_udn: device.parent_udn,
            friendly_name: device.friendly_name,
            services,
            default_service: RwLock::new(Some(default_service)),
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

    /// Default connection service, `None` once disposed
    pub fn default_service(&self) -> Option<Arc<WanConnectionService>> {
        self.default_service.read().ok()?.clone()
    }

    pub fn services(&self) -> &[Arc<WanConnectionService>] {
        &self.services
    }

    /// Whether the default service reports `Connected`; any failure counts as not connected
    pub fn is_connected(&self) -> bool {
        self.default_service()
            .and_then(|service| service.status_info().ok())
            .is_some_and(|info| info.is_connected())
    }

    /// Forward evented state variables to the service with `service_id`
    pub fn set_state_variables(&self, service_id: &str, variables: &HashMap<String, String>) {
        match self.services.iter().find(|s| s.id() == service_id) {
            Some(service) => service.set_state_variables(variables),
            None => tracing::debug!(
                "WANConnectionDevice '{}': event for unknown service {}",
                self.udn,
                service_id
            ),
        }
    }

    pub fn dispose(&self) {
        for service in &self.services {
            service.dispose();
        }
        if let Ok(mut default_service) = self.default_service.write() {
            *default_service = None;
        }
    }
}
