//! Action invocation seam and the generic service wrapper

use crate::error::{IgdError, Result};
use crate::urn;
use soap_client::{ActionResponse, SoapClient, SoapError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use upnp_discovery::DiscoveredService;

/// A UPnP service able to run control actions
///
/// This is the only contact point between the topology types and the
/// network. `SoapService` is the production implementation; tests and
/// embedding platforms provide their own.
pub trait UpnpService: Send + Sync {
    /// Service identifier, unique within its device
    fn id(&self) -> &str;

    /// Full service type URN, version suffix included
    fn service_type(&self) -> &str;

    /// Run `action` with the given input arguments, in order
    fn invoke(
        &self,
        action: &str,
        args: &[(&str, String)],
    ) -> std::result::Result<ActionResponse, SoapError>;
}

/// `UpnpService` backed by a SOAP control URL
#[derive(Debug, Clone)]
pub struct SoapService {
    id: String,
    service_type: String,
    control_url: String,
    client: SoapClient,
}

impl SoapService {
    pub fn new(
        id: impl Into<String>,
        service_type: impl Into<String>,
        control_url: impl Into<String>,
        client: SoapClient,
    ) -> Self {
        Self {
            id: id.into(),
            service_type: service_type.into(),
            control_url: control_url.into(),
            client,
        }
    }

    pub fn from_discovered(service: &DiscoveredService, client: SoapClient) -> Self {
        Self::new(
            service.service_id.clone(),
            service.service_type.clone(),
            service.control_url.clone(),
            client,
        )
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }
}

impl UpnpService for SoapService {
    fn id(&self) -> &str {
        &self.id
    }

    fn service_type(&self) -> &str {
        &self.service_type
    }

    fn invoke(
        &self,
        action: &str,
        args: &[(&str, String)],
    ) -> std::result::Result<ActionResponse, SoapError> {
        self.client
            .call(&self.control_url, &self.service_type, action, args)
    }
}

/// Wrapper shared by every typed service
///
/// Tracks the template version, the disposal flag and the last UPnP error
/// code returned by the device.
pub struct GenericService {
    inner: Arc<dyn UpnpService>,
    version: u32,
    disposed: AtomicBool,
    last_upnp_error_code: Mutex<Option<u16>>,
}

impl GenericService {
    pub fn new(inner: Arc<dyn UpnpService>) -> Self {
        let version = urn::type_version(inner.service_type());
        Self {
            inner,
            version,
            disposed: AtomicBool::new(false),
            last_upnp_error_code: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn service_type(&self) -> &str {
        self.inner.service_type()
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Last UPnP error code recorded for this service
    pub fn last_upnp_error_code(&self) -> Option<u16> {
        self.last_upnp_error_code.lock().ok().and_then(|code| *code)
    }

    pub(crate) fn record_upnp_error(&self, code: u16) {
        if let Ok(mut last) = self.last_upnp_error_code.lock() {
            *last = Some(code);
        }
    }

    /// Run an action on the underlying service
    ///
    /// # Errors
    ///
    /// `IgdError::Disposed` once `dispose()` was called, otherwise the
    /// converted transport or fault error.
    pub fn invoke(&self, action: &str, args: &[(&str, String)]) -> Result<ActionResponse> {
        if self.is_disposed() {
            return Err(IgdError::Disposed(self.id().to_string()));
        }
        tracing::trace!("{} -> {}({})", self.id(), action, urn::args_to_string(args));
        self.inner.invoke(action, args).map_err(IgdError::from)
    }

    /// Log evented state variables
    pub fn set_state_variables(&self, variables: &HashMap<String, String>) {
        let mut names: Vec<_> = variables.keys().collect();
        names.sort();
        for name in names {
            tracing::info!("{} state variable {} = {}", self.id(), name, variables[name]);
        }
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for GenericService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericService")
            .field("id", &self.id())
            .field("service_type", &self.service_type())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
