//! SSDP (Simple Service Discovery Protocol) client
//!
//! Internal M-SEARCH sender and response reader. Not part of the public API.

use crate::error::{DiscoveryError, Result};
use std::net::UdpSocket;
use std::time::Duration;

const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// SSDP response containing device information
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub urn: String,
    pub usn: String,
    pub server: Option<String>,
}

/// SSDP client for device discovery
pub(crate) struct SsdpClient {
    socket: UdpSocket,
}

impl SsdpClient {
    /// Create a new SSDP client with the specified read timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {}", e)))?;

        socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send an M-SEARCH request for `search_target`
    pub fn search(&self, search_target: &str, mx: u8) -> Result<()> {
        let request = build_msearch(search_target, mx);
        tracing::debug!("M-SEARCH {}", search_target);

        self.socket
            .send_to(request.as_bytes(), SSDP_MULTICAST_ADDR)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;
        Ok(())
    }

    /// Iterate over responses until the read timeout elapses
    pub fn responses(&self) -> SsdpResponseIterator<'_> {
        SsdpResponseIterator::new(&self.socket)
    }
}

fn build_msearch(search_target: &str, mx: u8) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: {}\r\n\
         ST: {}\r\n\
         USER-AGENT: gateway-commons/0.3 UPnP/1.1\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, mx, search_target
    )
}

/// Iterator for SSDP responses
pub(crate) struct SsdpResponseIterator<'a> {
    socket: &'a UdpSocket,
    buffer: [u8; 2048],
    finished: bool,
}

impl<'a> SsdpResponseIterator<'a> {
    fn new(socket: &'a UdpSocket) -> Self {
        Self {
            socket,
            buffer: [0; 2048],
            finished: false,
        }
    }
}

impl<'a> Iterator for SsdpResponseIterator<'a> {
    type Item = Result<SsdpResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((size, from)) => {
                    let Ok(text) = std::str::from_utf8(&self.buffer[..size]) else {
                        tracing::debug!("Ignoring non UTF-8 SSDP datagram from {}", from);
                        continue;
                    };
                    if let Some(response) = parse_ssdp_response(text) {
                        return Some(Ok(response));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut
                    {
                        return None;
                    }
                    return Some(Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))));
                }
            }
        }
        None
    }
}

/// Parse an SSDP response from HTTP text
fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut urn = None;
    let mut usn = None;
    let mut server = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            urn = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        }
    }

    match (location, urn, usn) {
        (Some(location), Some(urn), Some(usn)) => Some(SsdpResponse {
            location,
            urn,
            usn,
            server,
        }),
        _ => None,
    }
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len()
        && line.is_char_boundary(header.len())
        && line[..header.len()].eq_ignore_ascii_case(header)
    {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ssdp_response_valid() {
        let response = "HTTP/1.1 200 OK\r\n\
            CACHE-CONTROL: max-age=120\r\n\
            LOCATION: http://192.168.1.1:49152/rootDesc.xml\r\n\
            ST: urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\
            USN: uuid:824ff22b-8c7d-41c5-a131-44f534e12555::urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\
            SERVER: Linux/4.9 UPnP/1.1 MiniUPnPd/2.2.1\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();

        assert_eq!(parsed.location, "http://192.168.1.1:49152/rootDesc.xml");
        assert_eq!(parsed.urn, "urn:schemas-upnp-org:device:InternetGatewayDevice:1");
        assert!(parsed.usn.starts_with("uuid:824ff22b"));
        assert_eq!(parsed.server.as_deref(), Some("Linux/4.9 UPnP/1.1 MiniUPnPd/2.2.1"));
    }

    #[test]
    fn test_parse_ssdp_response_case_insensitive() {
        let response = "HTTP/1.1 200 OK\r\n\
            location: http://192.168.1.1:5000/desc.xml\r\n\
            st: urn:schemas-upnp-org:device:InternetGatewayDevice:2\r\n\
            usn: uuid:abc::urn:schemas-upnp-org:device:InternetGatewayDevice:2\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();
        assert_eq!(parsed.location, "http://192.168.1.1:5000/desc.xml");
        assert_eq!(parsed.server, None);
    }

    #[test]
    fn test_parse_ssdp_response_missing_required_headers() {
        let missing_location = "HTTP/1.1 200 OK\r\n\
            ST: urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\
            USN: uuid:abc\r\n\r\n";
        let missing_usn = "HTTP/1.1 200 OK\r\n\
            LOCATION: http://192.168.1.1/desc.xml\r\n\
            ST: urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n\r\n";

        assert!(parse_ssdp_response(missing_location).is_none());
        assert!(parse_ssdp_response(missing_usn).is_none());
        assert!(parse_ssdp_response("").is_none());
    }

    #[test]
    fn test_extract_header_value() {
        assert_eq!(
            extract_header_value("Location:   http://example.com  ", "LOCATION:"),
            Some("http://example.com".to_string())
        );
        assert_eq!(extract_header_value("LOCATION:", "LOCATION:"), None);
        assert_eq!(extract_header_value("LOCATIONS: x", "LOCATION:"), None);
        assert_eq!(extract_header_value("été: x", "ST:"), None);
    }

    #[test]
    fn test_build_msearch() {
        let request = build_msearch("urn:schemas-upnp-org:device:InternetGatewayDevice:1", 2);
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(request.contains("MX: 2\r\n"));
        assert!(request.contains("ST: urn:schemas-upnp-org:device:InternetGatewayDevice:1\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }
}
