use hostlock_hwid::SystemInfo;
use pretty_assertions::assert_eq;

#[test]
fn collection_fills_every_attribute() {
    let info = SystemInfo::collect();
    assert!(!info.platform.is_empty());
    assert!(!info.system.is_empty());
    assert!(!info.machine.is_empty());
    assert!(!info.hostname.is_empty());
    assert!(!info.fqdn.is_empty());
    assert!(!info.mac_address.is_empty());
    assert!(!info.cpu_id.is_empty());
    assert!(!info.disk_serial.is_empty());
    assert!(info.cpu_count > 0);
    assert!(info.total_ram > 0);
}

#[test]
fn mac_address_has_colon_separated_octets() {
    let info = SystemInfo::collect();
    // Probed or pseudo, the format contract is the same.
    let octets: Vec<&str> = info.mac_address.split(':').collect();
    assert_eq!(octets.len(), 6);
    for octet in octets {
        assert_eq!(octet.len(), 2);
        assert!(octet.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn node_matches_hostname() {
    let info = SystemInfo::collect();
    assert_eq!(info.node, info.hostname);
}

#[test]
fn serde_roundtrip_preserves_attributes() {
    let info = SystemInfo::collect();
    let json = serde_json::to_string(&info).unwrap();
    let parsed: SystemInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(info, parsed);
}

#[test]
fn repeated_collection_is_stable() {
    let a = SystemInfo::collect();
    let b = SystemInfo::collect();
    assert_eq!(a.mac_address, b.mac_address);
    assert_eq!(a.cpu_id, b.cpu_id);
    assert_eq!(a.disk_serial, b.disk_serial);
    assert_eq!(a.hostname, b.hostname);
}
