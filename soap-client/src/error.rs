//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the device
    ///
    /// `code` is the UPnP error code found in the fault detail, or 500 when
    /// the device did not provide one.
    #[error("SOAP fault: error code {code} ({description})")]
    Fault { code: u16, description: String },
}

impl SoapError {
    /// UPnP error code carried by a fault, if this error is one
    pub fn fault_code(&self) -> Option<u16> {
        match self {
            SoapError::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}
