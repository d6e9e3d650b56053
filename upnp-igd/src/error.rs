use soap_client::SoapError;
use thiserror::Error;

/// Errors raised while binding gateway devices or invoking their actions
#[derive(Debug, Error)]
pub enum IgdError {
    /// Network communication error
    ///
    /// The control endpoint could not be reached or the HTTP exchange failed.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered but the envelope or an output argument could not
    /// be read.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// UPnP error reported by the device in a SOAP fault
    #[error("UPnP error {code}: {description}")]
    UpnpError { code: u16, description: String },

    /// Invalid parameter value
    ///
    /// Raised before any request is sent, e.g. a port mapping without an
    /// internal client.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The device type is not one this crate binds
    #[error("Unsupported device type: {0}")]
    UnsupportedDevice(String),

    /// A WAN connection device exposes no WANIPConnection or WANPPPConnection service
    #[error("No WAN connection service on device {0}")]
    NoConnectionService(String),

    /// The service or device was disposed and can no longer be used
    #[error("Service {0} has been disposed")]
    Disposed(String),

    #[error("Discovery error: {0}")]
    Discovery(#[from] upnp_discovery::DiscoveryError),

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl IgdError {
    /// UPnP error code carried by this error, if any
    pub fn upnp_code(&self) -> Option<u16> {
        match self {
            IgdError::UpnpError { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Type alias for results that can return an IgdError
pub type Result<T> = std::result::Result<T, IgdError>;

impl From<SoapError> for IgdError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => IgdError::NetworkError(msg),
            SoapError::Parse(msg) => IgdError::ParseError(msg),
            SoapError::Fault { code, description } => IgdError::UpnpError { code, description },
        }
    }
}
