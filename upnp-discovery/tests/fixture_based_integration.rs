//! Fixture-based integration tests for gateway discovery
//!
//! These tests use captured gateway descriptions so that parsing,
//! flattening and HTTP fetching can be checked without a router.

mod helpers;

use helpers::{DeviceFixture, FixtureSet};
use mockito::Server;
use rstest::rstest;
use std::time::Duration;
use upnp_discovery::device::Root;
use upnp_discovery::{fetch_description, DiscoveryError};

#[rstest]
#[case("igd_v1_device.xml", "urn:schemas-upnp-org:device:InternetGatewayDevice:1", 3)]
#[case("igd_v2_device.xml", "urn:schemas-upnp-org:device:InternetGatewayDevice:2", 3)]
fn test_parse_gateway_fixture(
    #[case] fixture_file: &str,
    #[case] expected_type: &str,
    #[case] expected_devices: usize,
) {
    let fixture = DeviceFixture::load(fixture_file, "192.168.1.1");
    let root = Root::from_xml(&fixture.xml_content).expect("Failed to parse device XML");

    assert!(root.is_gateway());
    assert_eq!(root.device.device_type, expected_type);

    let devices = root.flatten(&fixture.location_url()).unwrap();
    assert_eq!(devices.len(), expected_devices);
    assert!(devices.iter().all(|d| d.location == fixture.location_url()));
}

#[rstest]
#[case("igd_v1_device.xml", "http://192.168.1.1:5000/ctl/IPConn")]
#[case("igd_v2_device.xml", "http://192.168.0.1:1900/ctl/IPConn")]
fn test_connection_service_control_url(#[case] fixture_file: &str, #[case] expected: &str) {
    let fixture = DeviceFixture::load(fixture_file, "192.168.1.1");
    let devices = Root::from_xml(&fixture.xml_content)
        .unwrap()
        .flatten(&fixture.location_url())
        .unwrap();

    let wcd = devices
        .iter()
        .find(|d| d.device_type.contains("WANConnectionDevice"))
        .expect("fixture has a connection device");
    let ip_conn = wcd
        .services
        .iter()
        .find(|s| s.service_type.contains("WANIPConnection"))
        .expect("connection device has a WANIPConnection");

    assert_eq!(ip_conn.control_url, expected);
}

#[test]
fn test_tree_links_children_to_parents() {
    let fixture = DeviceFixture::load("igd_v1_device.xml", "192.168.1.1");
    let devices = Root::from_xml(&fixture.xml_content)
        .unwrap()
        .flatten(&fixture.location_url())
        .unwrap();

    for pair in devices.windows(2) {
        assert_eq!(pair[1].parent_udn.as_deref(), Some(pair[0].udn.as_str()));
    }
    assert_eq!(devices[2].services.len(), 2);
}

#[rstest]
#[case(FixtureSet::single_v1_gateway(), 1)]
#[case(FixtureSet::both_gateway_versions(), 2)]
#[case(FixtureSet::mixed_devices(), 2)]
#[case(FixtureSet::empty(), 0)]
fn test_gateway_filtering(#[case] fixture_set: FixtureSet, #[case] expected_gateways: usize) {
    let gateways = fixture_set
        .devices
        .iter()
        .map(|f| {
            Root::from_xml(&f.xml_content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", f.name, e))
        })
        .filter(Root::is_gateway)
        .count();

    assert_eq!(gateways, expected_gateways);
}

#[test]
fn test_fetch_description_from_mock_server() {
    let mut server = Server::new();
    let fixture = DeviceFixture::load("igd_v1_device.xml", "192.168.1.1");

    let mock = server
        .mock("GET", "/rootDesc.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(&fixture.xml_content)
        .create();

    let location = format!("{}/rootDesc.xml", server.url());
    let devices = fetch_description(&location, Duration::from_secs(2)).unwrap();

    mock.assert();
    assert_eq!(devices.len(), 3);
    assert_eq!(devices[0].friendly_name, "Livebox");
    assert_eq!(devices[0].model_name.as_deref(), Some("Livebox 4"));
    assert!(devices[2].services[0].control_url.starts_with(&server.url()));
}

#[test]
fn test_fetch_description_rejects_non_gateway() {
    let mut server = Server::new();
    let fixture = DeviceFixture::load("non_gateway_device.xml", "192.168.1.20");
    let _mock = server
        .mock("GET", "/rootDesc.xml")
        .with_status(200)
        .with_body(&fixture.xml_content)
        .create();

    let location = format!("{}/rootDesc.xml", server.url());
    let err = fetch_description(&location, Duration::from_secs(2)).unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidDevice(_)));
}

#[test]
fn test_fetch_description_http_error() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/rootDesc.xml").with_status(404).create();

    let location = format!("{}/rootDesc.xml", server.url());
    let err = fetch_description(&location, Duration::from_secs(2)).unwrap_err();
    assert!(matches!(err, DiscoveryError::NetworkError(_)));
}

#[test]
fn test_fetch_description_invalid_xml() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/rootDesc.xml")
        .with_status(200)
        .with_body("<root><device>")
        .create();

    let location = format!("{}/rootDesc.xml", server.url());
    let err = fetch_description(&location, Duration::from_secs(2)).unwrap_err();
    assert!(matches!(err, DiscoveryError::ParseError(_)));
}

#[test]
fn test_discovered_devices_serialize_to_json() {
    let fixture = DeviceFixture::load("igd_v2_device.xml", "192.168.0.1");
    let devices = Root::from_xml(&fixture.xml_content)
        .unwrap()
        .flatten(&fixture.location_url())
        .unwrap();

    let json = serde_json::to_value(&devices).unwrap();
    assert_eq!(json[0]["parent_udn"], serde_json::Value::Null);
    assert_eq!(json[1]["parent_udn"], "uuid:00000000-0000-0000-0000-000000000000");
    assert_eq!(json[2]["services"][0]["service_id"], "urn:upnp-org:serviceId:WANIPConn1");
}
