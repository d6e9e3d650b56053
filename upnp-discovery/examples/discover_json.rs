//! Gateway discovery that prints the flattened device trees as JSON
//!
//! Usage: cargo run -p gateway-commons-upnp-discovery --example discover_json [timeout_secs]

use std::time::Duration;
use upnp_discovery::get_with_timeout;

fn main() {
    let timeout = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let devices = get_with_timeout(Duration::from_secs(timeout));

    match serde_json::to_string_pretty(&devices) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize devices: {}", e),
    }
}
