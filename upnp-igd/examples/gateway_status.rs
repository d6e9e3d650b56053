//! Discover gateways and print their WAN connection status
//!
//! Usage: GATEWAY_LOG_MODE=development cargo run -p gateway-commons-upnp-igd --example gateway_status

use std::time::Duration;
use upnp_igd::logging::init_logging_from_env;
use upnp_igd::{DeviceManager, DiscoveryConfig, SoapClient};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    let manager = DeviceManager::new();
    let config = DiscoveryConfig {
        timeout: Duration::from_secs(5),
        ..DiscoveryConfig::default()
    };
    let gateways = manager.discover(config, &SoapClient::new());

    if gateways.is_empty() {
        println!("No Internet Gateway Device found");
        return Ok(());
    }

    for gateway in gateways {
        println!("{} ({})", gateway.friendly_name(), gateway.udn());

        let Some(service) = gateway
            .default_wan_connection_device()
            .and_then(|wcd| wcd.default_service())
        else {
            println!("  no WAN connection");
            continue;
        };

        match service.status_info() {
            Ok(status) => println!("  {}", status),
            Err(e) => println!("  status unavailable: {}", e),
        }
        match service.external_ip_address() {
            Ok(ip) => println!("  external IP: {}", ip),
            Err(e) => println!("  external IP unavailable: {}", e),
        }
        for mapping in service.port_mappings()? {
            println!(
                "  {} {} -> {}:{} '{}'",
                mapping.protocol,
                mapping.external_port,
                mapping.internal_client,
                mapping.internal_port,
                mapping.description
            );
        }
    }
    Ok(())
}
