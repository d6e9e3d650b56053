//! Core discovery logic and iterator implementation.
//!
//! The discovery algorithm:
//! 1. Sends SSDP M-SEARCH requests for each configured search target
//! 2. Receives and deduplicates SSDP responses by location
//! 3. Fetches each device description via HTTP
//! 4. Keeps gateway descriptions and flattens their device trees
//! 5. Yields every device of the tree as a `DeviceEvent::Found`

use crate::device::Root;
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse};
use crate::{DeviceEvent, DiscoveredDevice, DiscoveryConfig};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Iterator that discovers Internet Gateway Devices on the local network.
///
/// Each gateway found contributes one event per device of its tree, root
/// first. Deduplication by description location is automatic.
///
/// # Examples
///
/// ```no_run
/// use upnp_discovery::{get_iter, DeviceEvent};
///
/// for event in get_iter() {
///     match event {
///         DeviceEvent::Found(device) => {
///             println!("Found: {} ({})", device.friendly_name, device.device_type);
///         }
///     }
/// }
/// ```
pub struct DiscoveryIterator {
    ssdp_client: Option<SsdpClient>,
    search_targets: Vec<String>,
    mx: u8,
    ssdp_buffer: Vec<SsdpResponse>,
    buffer_index: usize,
    pending: VecDeque<DiscoveredDevice>,
    seen_locations: HashSet<String>,
    http_client: reqwest::blocking::Client,
}

impl DiscoveryIterator {
    /// Create a new discovery iterator with the given configuration
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let ssdp_client = SsdpClient::new(config.timeout)?;
        let http_client = build_http_client(config.timeout)?;

        Ok(Self {
            ssdp_client: Some(ssdp_client),
            search_targets: config.search_targets,
            mx: config.mx,
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            pending: VecDeque::new(),
            seen_locations: HashSet::new(),
            http_client,
        })
    }

    /// Create an empty iterator that yields no results
    /// Used as a fallback when initialization fails
    pub(crate) fn empty() -> Self {
        Self {
            ssdp_client: None,
            search_targets: Vec::new(),
            mx: 0,
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            pending: VecDeque::new(),
            seen_locations: HashSet::new(),
            http_client: reqwest::blocking::Client::new(),
        }
    }

    /// Check if an SSDP response is likely from a gateway (early filtering)
    fn is_likely_gateway(response: &SsdpResponse) -> bool {
        response.urn.contains("InternetGatewayDevice") || response.usn.contains("InternetGatewayDevice")
    }

    /// Send the searches and collect every response until the timeout
    fn fill_buffer(&mut self) {
        let Some(client) = self.ssdp_client.take() else {
            return;
        };

        for target in &self.search_targets {
            if let Err(e) = client.search(target, self.mx) {
                tracing::warn!("SSDP search for {} failed: {}", target, e);
            }
        }

        for result in client.responses() {
            match result {
                Ok(response) => self.ssdp_buffer.push(response),
                Err(e) => tracing::debug!("SSDP receive stopped: {}", e),
            }
        }
        tracing::debug!("SSDP search collected {} responses", self.ssdp_buffer.len());
    }
}

impl Iterator for DiscoveryIterator {
    type Item = DeviceEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ssdp_client.is_some() {
            self.fill_buffer();
        }

        loop {
            if let Some(device) = self.pending.pop_front() {
                return Some(DeviceEvent::Found(device));
            }

            if self.buffer_index >= self.ssdp_buffer.len() {
                return None;
            }

            let ssdp_response = &self.ssdp_buffer[self.buffer_index];
            self.buffer_index += 1;

            if !self.seen_locations.insert(ssdp_response.location.clone()) {
                continue;
            }

            if !Self::is_likely_gateway(ssdp_response) {
                continue;
            }

            let location = ssdp_response.location.clone();
            match fetch_with(&self.http_client, &location) {
                Ok(devices) => self.pending.extend(devices),
                Err(e) => tracing::warn!("Skipping gateway at {}: {}", location, e),
            }
        }
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))
}

/// Fetch a device description and flatten it, rejecting non-gateway roots
pub(crate) fn fetch_with(
    http_client: &reqwest::blocking::Client,
    location: &str,
) -> Result<Vec<DiscoveredDevice>> {
    let response = http_client.get(location).send().map_err(|e| {
        if e.is_timeout() {
            DiscoveryError::Timeout
        } else {
            DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e))
        }
    })?;

    if !response.status().is_success() {
        return Err(DiscoveryError::NetworkError(format!(
            "Device description request returned HTTP {}",
            response.status()
        )));
    }

    let xml = response
        .text()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))?;

    let root = Root::from_xml(&xml)?;
    if !root.is_gateway() {
        return Err(DiscoveryError::InvalidDevice(format!(
            "{} is a {}",
            root.device.udn, root.device.device_type
        )));
    }
    root.flatten(location)
}

/// Fetch the device description at a known location
///
/// This bypasses SSDP, for gateways whose description URL is already known.
pub fn fetch_description(location: &str, timeout: Duration) -> Result<Vec<DiscoveredDevice>> {
    let http_client = build_http_client(timeout)?;
    fetch_with(&http_client, location)
}
