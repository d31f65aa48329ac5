use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use proptest::prelude::*;

use peerlink_types::{Endpoint, NewPeer, PeerRecord};

fn peer_id() -> impl Strategy<Value = String> {
    "12D3KooW[1-9A-HJ-NP-Za-km-z]{44}"
}

fn gossip_address() -> impl Strategy<Value = String> {
    (any::<[u8; 4]>(), 1u16..).prop_map(|(ip, port)| {
        format!("/ip4/{}/tcp/{port}", Ipv4Addr::from(ip))
    })
}

proptest! {
    /// full_address always appends the id to the first advertised address.
    #[test]
    fn full_address_uses_first_address(
        id in peer_id(),
        addresses in prop::collection::vec(gossip_address(), 1..4),
    ) {
        let refs: Vec<&str> = addresses.iter().map(String::as_str).collect();
        let record = PeerRecord::new(&id, "node-b", &refs);
        prop_assert_eq!(record.full_address(), Some(format!("{}/p2p/{}", addresses[0], id)));
    }

    /// Records decode regardless of extra fields the service adds.
    #[test]
    fn unknown_fields_are_ignored(
        id in peer_id(),
        address in gossip_address(),
        connected in any::<bool>(),
    ) {
        let json = serde_json::json!({
            "id": id,
            "alias": "node-b",
            "multiAddresses": [address],
            "connected": connected,
            "relation": "known",
        });
        let record: PeerRecord = serde_json::from_value(json).unwrap();
        prop_assert_eq!(record, PeerRecord::new(&id, "node-b", &[address.as_str()]));
    }

    /// Create requests carry the address under `multiAddress`.
    #[test]
    fn new_peer_wire_field_names(address in gossip_address(), id in peer_id()) {
        let full = format!("{address}/p2p/{id}");
        let value = serde_json::to_value(NewPeer::new(full.clone(), "node-b")).unwrap();
        prop_assert_eq!(&value["multiAddress"], &serde_json::json!(full));
        prop_assert_eq!(&value["alias"], &serde_json::json!("node-b"));
    }

    /// Endpoint authorities are valid socket addresses for both families.
    #[test]
    fn authority_parses_as_socket_addr(
        v4 in any::<[u8; 4]>(),
        v6 in any::<[u8; 16]>(),
        port in 1u16..,
    ) {
        for ip in [IpAddr::from(Ipv4Addr::from(v4)), IpAddr::from(Ipv6Addr::from(v6))] {
            let parsed: SocketAddr = Endpoint::new(ip).authority(port).parse().unwrap();
            prop_assert_eq!(parsed, SocketAddr::new(ip, port));
        }
    }
}
