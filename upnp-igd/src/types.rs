//! Value types exchanged with WAN connection services

use crate::error::{IgdError, Result};
use std::fmt;
use std::str::FromStr;

/// Longest lease a port mapping may request, in seconds (one week)
pub const MAX_LEASE_DURATION: u32 = 604_800;

/// Transport protocol of a port mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = IgdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            other => Err(IgdError::ParseError(format!("Unknown protocol: {}", other))),
        }
    }
}

/// A NAT port mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Remote host the mapping is restricted to, `None` for any host
    pub remote_host: Option<String>,
    pub external_port: u16,
    pub protocol: Protocol,
    pub internal_port: u16,
    /// LAN address the traffic is forwarded to
    pub internal_client: String,
    pub enabled: bool,
    pub description: String,
    /// Lease in seconds, 0 for a permanent mapping
    pub lease_duration: u32,
}

impl PortMapping {
    /// Enabled, permanent mapping of `external_port` to the same port on `internal_client`
    pub fn new(protocol: Protocol, external_port: u16, internal_client: impl Into<String>) -> Self {
        Self {
            remote_host: None,
            external_port,
            protocol,
            internal_port: external_port,
            internal_client: internal_client.into(),
            enabled: true,
            description: String::new(),
            lease_duration: 0,
        }
    }

    pub fn with_internal_port(mut self, internal_port: u16) -> Self {
        self.internal_port = internal_port;
        self
    }

    pub fn with_remote_host(mut self, remote_host: impl Into<String>) -> Self {
        self.remote_host = Some(remote_host.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_lease_duration(mut self, lease_duration: u32) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    /// Check the mapping before it is sent to a device
    pub fn validate(&self) -> Result<()> {
        if self.internal_port == 0 {
            return Err(IgdError::InvalidParameter(
                "internal port must not be 0".to_string(),
            ));
        }
        if self.internal_client.trim().is_empty() {
            return Err(IgdError::InvalidParameter(
                "internal client must not be empty".to_string(),
            ));
        }
        if self.lease_duration > MAX_LEASE_DURATION {
            return Err(IgdError::InvalidParameter(format!(
                "lease duration {} exceeds {} seconds",
                self.lease_duration, MAX_LEASE_DURATION
            )));
        }
        Ok(())
    }
}

/// Connection status reported by `GetStatusInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Unconfigured,
    Connecting,
    Authenticating,
    PendingDisconnect,
    Disconnecting,
    Disconnected,
    Connected,
    Unknown,
}

impl ConnectionState {
    /// Parse the wire value; anything unrecognized is `Unknown`
    pub fn from_wire(value: &str) -> Self {
        match value.trim() {
            "Unconfigured" => ConnectionState::Unconfigured,
            "Connecting" => ConnectionState::Connecting,
            "Authenticating" => ConnectionState::Authenticating,
            "PendingDisconnect" => ConnectionState::PendingDisconnect,
            "Disconnecting" => ConnectionState::Disconnecting,
            "Disconnected" => ConnectionState::Disconnected,
            "Connected" => ConnectionState::Connected,
            _ => ConnectionState::Unknown,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of `GetStatusInfo`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub connection_state: ConnectionState,
    pub last_error: String,
    /// Seconds since the connection was established
    pub uptime: u32,
}

impl StatusInfo {
    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }
}

impl fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnectionState={}, LastConnectionError={}, Uptime={} sec",
            self.connection_state, self.last_error, self.uptime
        )
    }
}

/// Result of `GetNATRSIPStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatRsipStatus {
    pub nat_enabled: bool,
    pub rsip_available: bool,
}
