//! Private SOAP client for UPnP control actions
//!
//! This crate provides a minimal SOAP client specifically designed for
//! invoking actions on UPnP services such as the WAN connection services of
//! an Internet Gateway Device. Control URLs are absolute, as resolved from
//! the device description.

mod error;
mod response;

pub use error::SoapError;
pub use response::ActionResponse;

use std::time::Duration;
use xmltree::Element;

/// Timeouts applied to every SOAP exchange
#[derive(Debug, Clone)]
pub struct SoapConfig {
    /// Default: 5 seconds
    pub connect_timeout: Duration,
    /// Default: 10 seconds
    pub read_timeout: Duration,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_config(SoapConfig::default())
    }

    /// Create a SOAP client with custom timeouts
    pub fn with_config(config: SoapConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout_read(config.read_timeout)
                .build(),
        }
    }

    /// Invoke `action` on the service reachable at `control_url`
    ///
    /// Arguments are sent in the given order. The returned response maps the
    /// action's output arguments to their textual values.
    pub fn call(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(&str, String)],
    ) -> Result<ActionResponse, SoapError> {
        let body = build_envelope(service_type, action, args);
        let soap_action = format!("\"{}#{}\"", service_type, action);

        tracing::debug!("SOAP {} -> {}", soap_action, control_url);

        let xml_text = match self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=\"utf-8\"")
            .set("SOAPACTION", &soap_action)
            .send_string(&body)
        {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            // UPnP devices answer faults with HTTP 500 and a SOAP body
            Err(ureq::Error::Status(500, response)) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            Err(ureq::Error::Status(code, _)) => {
                return Err(SoapError::Network(format!(
                    "{} failed: HTTP {}",
                    action, code
                )))
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        extract_response(&xml, action).map(|element| ActionResponse::from_element(&element))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_envelope(service_type: &str, action: &str, args: &[(&str, String)]) -> String {
    let payload: String = args
        .iter()
        .map(|(name, value)| format!("<{name}>{}</{name}>", escape_xml(value)))
        .collect();

    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">
    <s:Body>
        <u:{action} xmlns:u="{service_type}">{payload}</u:{action}>
    </s:Body>
</s:Envelope>"#
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn extract_response(xml: &Element, action: &str) -> Result<Element, SoapError> {
    let body = xml
        .get_child("Body")
        .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

    // Check for SOAP fault first
    if let Some(fault) = body.get_child("Fault") {
        let upnp_error = fault
            .get_child("detail")
            .and_then(|d| d.get_child("UPnPError"));
        let code = upnp_error
            .and_then(|e| e.get_child("errorCode"))
            .and_then(|c| c.get_text())
            .and_then(|t| t.trim().parse::<u16>().ok())
            .unwrap_or(500);
        let description = upnp_error
            .and_then(|e| e.get_child("errorDescription"))
            .or_else(|| fault.get_child("faultstring"))
            .and_then(|d| d.get_text())
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        return Err(SoapError::Fault { code, description });
    }

    let response_name = format!("{}Response", action);
    body.get_child(response_name.as_str())
        .cloned()
        .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_contains_ordered_escaped_arguments() {
        let body = build_envelope(
            "urn:schemas-upnp-org:service:WANIPConnection:1",
            "AddPortMapping",
            &[
                ("NewRemoteHost", String::new()),
                ("NewExternalPort", "8080".to_string()),
                ("NewPortMappingDescription", "a<b & c".to_string()),
            ],
        );

        assert!(body.contains(
            r#"<u:AddPortMapping xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1">"#
        ));
        let remote = body.find("<NewRemoteHost>").unwrap();
        let port = body.find("<NewExternalPort>8080</NewExternalPort>").unwrap();
        assert!(remote < port);
        assert!(body.contains("<NewPortMappingDescription>a&lt;b &amp; c</NewPortMappingDescription>"));
    }

    #[test]
    fn test_extract_response_with_valid_response() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:GetExternalIPAddressResponse xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1">
                        <NewExternalIPAddress>90.42.73.18</NewExternalIPAddress>
                    </u:GetExternalIPAddressResponse>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let response = extract_response(&xml, "GetExternalIPAddress").unwrap();
        assert_eq!(response.name, "GetExternalIPAddressResponse");
    }

    #[test]
    fn test_extract_response_with_soap_fault() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>725</errorCode>
                                <errorDescription>OnlyPermanentLeasesSupported</errorDescription>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match extract_response(&xml, "AddPortMapping").unwrap_err() {
            SoapError::Fault { code, description } => {
                assert_eq!(code, 725);
                assert_eq!(description, "OnlyPermanentLeasesSupported");
            }
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_body() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match extract_response(&xml, "GetStatusInfo").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing SOAP Body")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_action_response() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match extract_response(&xml, "GetStatusInfo").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing GetStatusInfoResponse element")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_soap_fault_with_default_error_code() {
        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Server</faultcode>
                        <faultstring>Internal Error</faultstring>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let err = extract_response(&xml, "GetStatusInfo").unwrap_err();
        assert_eq!(err.fault_code(), Some(500));
        assert!(err.to_string().contains("Internal Error"));
    }
}
