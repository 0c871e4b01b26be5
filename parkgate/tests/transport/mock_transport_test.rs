#[path = "../common/mod.rs"]
mod common;

use parkgate::config::PortConfig;
use parkgate::transport::{MockTransport, Transport};
use parkgate::Error;

#[test]
fn write_failure_and_recovery() {
    let mut m = MockTransport::new();
    m.open(&PortConfig::default()).unwrap();
    m.set_write_failures(1);

    // First write should fail (simulated)
    assert!(m.write_bytes(&common::fixtures::search_frame()).is_err());

    // Second one goes through and is recorded
    m.write_bytes(&common::fixtures::search_frame()).unwrap();
    assert_eq!(m.sent(), vec![common::fixtures::search_frame()]);
}

#[test]
fn closed_transport_refuses_io() {
    let mut m = MockTransport::new();
    assert!(matches!(m.write_bytes(&[0x02]), Err(Error::NotOpen)));
    assert!(matches!(m.read_available(), Err(Error::NotOpen)));

    m.open(&PortConfig::default()).unwrap();
    assert!(matches!(
        m.open(&PortConfig::default()),
        Err(Error::AlreadyOpen)
    ));
    m.push_incoming(&common::fixtures::search_ok_reply());
    assert_eq!(m.read_available().unwrap(), common::fixtures::search_ok_reply());
    assert!(m.read_available().unwrap().is_empty());
}
