// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Connection Topologies
//!
//! Multi-link topologies touch exactly two ports per link, generated names
//! do not depend on link order, and port ownership across a connection set
//! is exclusive.

use std::collections::BTreeSet;

use cim_fabric::domain::PortName;
use cim_fabric::service::check_port_uniqueness;
use cim_fabric::wiring::{
    ConnBundled, ConnEslag, ConnMclag, ConnUnbundled, ConnVpcLoopback, Connection,
    ConnectionSpec, ServerToSwitchLink, SwitchToSwitchLink,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// ESLAG links from one server to `switches` leaves, `per_switch` links each
fn eslag_links(switches: usize, per_switch: usize) -> Vec<ServerToSwitchLink> {
    let mut links = Vec::new();
    for leaf in 1..=switches {
        for port in 1..=per_switch {
            let index = links.len() + 1;
            links.push(ServerToSwitchLink::new(
                format!("server-1/enp2s{index}"),
                format!("leaf-{leaf}/E1/{port}"),
            ));
        }
    }
    links
}

fn shuffled_eslag() -> impl Strategy<Value = (Vec<ServerToSwitchLink>, Vec<ServerToSwitchLink>)> {
    (2usize..=4, 1usize..=3).prop_flat_map(|(switches, per_switch)| {
        let links = eslag_links(switches, per_switch);
        (Just(links.clone()), Just(links).prop_shuffle())
    })
}

fn port_name() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9-]{0,11}", "[A-Za-z0-9/]{1,12}").prop_map(|(device, port)| format!("{device}/{port}"))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: server-facing bundles use two ports per link
    #[test]
    fn prop_bundle_ports_twice_links(count in 1usize..16) {
        let links: Vec<ServerToSwitchLink> = (1..=count)
            .map(|i| ServerToSwitchLink::new(format!("server-1/enp{i}"), format!("leaf-1/E1/{i}")))
            .collect();

        let bundled = ConnectionSpec::from(ConnBundled { links: links.clone(), mtu: None });
        prop_assert_eq!(bundled.endpoints().unwrap().ports.len(), 2 * count);

        let split: Vec<ServerToSwitchLink> = links
            .into_iter()
            .enumerate()
            .map(|(i, mut link)| {
                link.switch = format!("leaf-{}/E1/{}", 1 + i % 2, i + 1);
                link
            })
            .collect();
        let mclag = ConnectionSpec::from(ConnMclag { links: split, mtu: None, fallback: false });
        match mclag.endpoints() {
            Ok(endpoints) => {
                prop_assert_eq!(endpoints.ports.len(), 2 * count);
            }
            // One link reaches only one switch
            Err(e) => {
                prop_assert!(count == 1 && e.is_structural());
            }
        }
    }

    /// Property: ESLAG port count and name are independent of link order
    #[test]
    fn prop_eslag_order_independent((links, shuffled) in shuffled_eslag()) {
        let original = ConnectionSpec::from(ConnEslag { links: links.clone(), mtu: None, fallback: false });
        let reordered = ConnectionSpec::from(ConnEslag { links: shuffled, mtu: None, fallback: false });

        let endpoints = original.endpoints().unwrap();
        let reordered_endpoints = reordered.endpoints().unwrap();
        prop_assert_eq!(endpoints.ports.len(), 2 * links.len());
        prop_assert_eq!(&endpoints, &reordered_endpoints);
        prop_assert_eq!(original.generate_name(), reordered.generate_name());
    }

    /// Property: loopback pairs stay on one switch
    #[test]
    fn prop_vpc_loopback_ports(count in 1usize..12) {
        let links: Vec<SwitchToSwitchLink> = (0..count)
            .map(|i| SwitchToSwitchLink::new(format!("leaf-1/E1/{}", 2 * i + 1), format!("leaf-1/E1/{}", 2 * i + 2)))
            .collect();
        let spec = ConnectionSpec::from(ConnVpcLoopback { links });
        let endpoints = spec.endpoints().unwrap();
        prop_assert_eq!(endpoints.switches.len(), 1);
        prop_assert_eq!(endpoints.ports.len(), 2 * count);
        prop_assert_eq!(spec.generate_name(), "leaf-1--vpc-loopback");
    }

    /// Property: a connection set is valid exactly when no switch port repeats
    #[test]
    fn prop_port_uniqueness(switch_ports in prop::collection::vec(1u16..24, 1..10)) {
        let connections: Vec<Connection> = switch_ports
            .iter()
            .enumerate()
            .map(|(i, port)| Connection::from_spec(ConnUnbundled {
                link: ServerToSwitchLink::new(format!("server-{i}/enp2s1"), format!("leaf-1/E1/{port}")),
                mtu: None,
            }))
            .collect();

        let distinct: BTreeSet<&u16> = switch_ports.iter().collect();
        let result = check_port_uniqueness(&connections);
        prop_assert_eq!(result.is_ok(), distinct.len() == switch_ports.len());
        if let Err(e) = result {
            prop_assert!(e.is_relationship_violation());
        }
    }

    /// Property: port names split at the first separator
    #[test]
    fn prop_port_name_split(name in port_name()) {
        let port = PortName::new(&name).unwrap();
        prop_assert!(!port.device().contains('/'));
        prop_assert_eq!(format!("{}/{}", port.device(), port.local_port()), name.clone());
        prop_assert_eq!(port.to_string(), name);
    }
}
