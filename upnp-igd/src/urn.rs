//! URN helpers for device and service type matching

pub const INTERNET_GATEWAY_DEVICE: &str = "urn:schemas-upnp-org:device:InternetGatewayDevice";
pub const WAN_DEVICE: &str = "urn:schemas-upnp-org:device:WANDevice";
pub const WAN_CONNECTION_DEVICE: &str = "urn:schemas-upnp-org:device:WANConnectionDevice";
pub const WAN_IP_CONNECTION: &str = "urn:schemas-upnp-org:service:WANIPConnection";
pub const WAN_PPP_CONNECTION: &str = "urn:schemas-upnp-org:service:WANPPPConnection";

/// Versions of the IGD device and service templates this crate binds
pub const SUPPORTED_VERSIONS: &[u32] = &[1, 2];

/// Whether `device_type` is exactly `{base_urn}:{v}` for one of `versions`
pub fn is_supported_device(base_urn: &str, versions: &[u32], device_type: &str) -> bool {
    matches_versioned(base_urn, versions, device_type)
}

/// Whether `service_type` is `{urn}:{v}` for one of `urns` and `versions`
pub fn check_service_version(service_type: &str, urns: &[&str], versions: &[u32]) -> bool {
    urns.iter()
        .any(|urn| matches_versioned(urn, versions, service_type))
}

fn matches_versioned(base: &str, versions: &[u32], urn: &str) -> bool {
    urn.strip_prefix(base)
        .and_then(|rest| rest.strip_prefix(':'))
        .and_then(|version| version.parse::<u32>().ok())
        .is_some_and(|version| versions.contains(&version))
}

/// Version suffix of a type URN; 1 when absent or malformed
pub fn type_version(urn: &str) -> u32 {
    urn.rsplit(':')
        .next()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

/// Render action arguments as `k='v', k2='v2'` for log lines
pub fn args_to_string(args: &[(&str, String)]) -> String {
    args.iter()
        .map(|(name, value)| format!("{}='{}'", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}
