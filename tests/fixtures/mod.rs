// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-fabric
//!
//! Builds one small, deterministic reference fabric in a [`MemoryStore`]:
//!
//! ```text
//!                   spine-1
//!          /           |           \
//!      leaf-1 ══════ leaf-2       leaf-3 (group: border)     border-1 (group: border)
//!      |    \  mclag   /           |    \                    |         \
//!  server-3  server-1          server-2  control-1         ext-1   static 10.99.0.0/16
//! ```
//!
//! - server-1 is attached to vpc-1/subnet-1
//! - server-2 is attached to vpc-2/subnet-1
//! - server-3 is attached to vpc-3/subnet-1
//! - vpc-1 and vpc-2 peer with `{vpc-1: [subnet-1], vpc-2: [*]}`
//! - vpc-1/subnet-1 peers with ext-1 for `0.0.0.0/0`
//! - border-1 carries a static external routed into vpc-1
//!
//! # Design Principles
//! - All names and addresses are fixed constants
//! - Fixtures are the only place that builds the reference fabric
//! - Tests that need a variation apply a replacement object on top

#![allow(dead_code)]

use std::sync::Arc;

use cim_fabric::config::FabricConfig;
use cim_fabric::domain::VlanRange;
use cim_fabric::service::{AttachmentIndex, ReachabilityEngine, ValidationService};
use cim_fabric::store::MemoryStore;
use cim_fabric::vpc::{
    External, ExternalAttachment, ExternalPeering, Ipv4Namespace, Subnet, Vpc, VpcAttachment,
    VpcPeering, VpcPeeringSpec, VpcSpec,
};
use cim_fabric::wiring::{
    ConnExternal, ConnFabric, ConnMclag, ConnMclagDomain, ConnStaticExternal, ConnUnbundled,
    Connection, ExternalLink, FabricLink, RedundancyType, Server, ServerToSwitchLink,
    StaticExternalLink, Switch, SwitchGroup, SwitchRole, SwitchSpec, SwitchToSwitchLink,
    VlanNamespace,
};

// Connection names as generated from their specs
pub const SERVER_1_CONN: &str = "server-1--mclag--leaf-1--leaf-2";
pub const SERVER_2_CONN: &str = "server-2--unbundled--leaf-3";
pub const SERVER_3_CONN: &str = "server-3--unbundled--leaf-1";
pub const CONTROL_CONN: &str = "control-1--unbundled--leaf-3";
pub const MCLAG_DOMAIN_CONN: &str = "leaf-1--mclag-domain--leaf-2";
pub const EXTERNAL_CONN: &str = "border-1--external";
pub const STATIC_EXTERNAL_CONN: &str = "border-1--static-external";

pub const VPC_PEERING: &str = "vpc-1--vpc-2";
pub const EXTERNAL: &str = "ext-1";
pub const EXTERNAL_ATTACHMENT: &str = "border-1--ext-1";
pub const EXTERNAL_PEERING: &str = "vpc-1--ext-1";

pub const STATIC_EXTERNAL_SUBNET: &str = "10.99.0.0/16";
pub const TENANT_VLAN_NAMESPACE: &str = "tenant";

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Wiring
// ============================================================================

pub fn s2s(server: &str, switch: &str) -> ServerToSwitchLink {
    ServerToSwitchLink::new(server, switch)
}

pub fn unbundled(server: &str, switch: &str) -> Connection {
    Connection::from_spec(ConnUnbundled {
        link: s2s(server, switch),
        mtu: None,
    })
}

pub fn mclag(links: Vec<ServerToSwitchLink>) -> Connection {
    Connection::from_spec(ConnMclag {
        links,
        mtu: None,
        fallback: false,
    })
}

pub fn fabric(spine: &str, leaf: &str) -> Connection {
    Connection::from_spec(ConnFabric {
        links: vec![FabricLink::new(spine, leaf)],
    })
}

pub fn border_leaf(name: &str) -> Switch {
    Switch::new(
        name,
        SwitchSpec {
            role: SwitchRole::BorderLeaf,
            groups: vec!["border".to_string()],
            ..Default::default()
        },
    )
}

pub fn switches() -> Vec<Switch> {
    vec![
        Switch::spine("spine-1"),
        Switch::leaf("leaf-1")
            .with_redundancy("mclag-1", RedundancyType::Mclag)
            .with_vlan_namespace("default"),
        Switch::leaf("leaf-2")
            .with_redundancy("mclag-1", RedundancyType::Mclag)
            .with_vlan_namespace("default"),
        Switch::leaf("leaf-3").with_group("border"),
        border_leaf("border-1")
            .with_vlan_namespace("default")
            .with_vlan_namespace(TENANT_VLAN_NAMESPACE),
    ]
}

pub fn servers() -> Vec<Server> {
    vec![
        Server::new("server-1"),
        Server::new("server-2"),
        Server::new("server-3"),
        Server::control("control-1"),
    ]
}

pub fn static_external() -> ConnStaticExternal {
    ConnStaticExternal {
        link: StaticExternalLink {
            switch: "border-1/E1/10".to_string(),
            ip: "172.31.0.1/24".to_string(),
            subnets: vec![STATIC_EXTERNAL_SUBNET.to_string()],
            next_hop: Some("172.31.0.254".to_string()),
            vlan: None,
        },
        within_vpc: Some("vpc-1".to_string()),
    }
}

pub fn connections() -> Vec<Connection> {
    vec![
        mclag(vec![
            s2s("server-1/enp2s1", "leaf-1/E1/1"),
            s2s("server-1/enp2s2", "leaf-2/E1/1"),
        ]),
        unbundled("server-2/enp2s1", "leaf-3/E1/1"),
        unbundled("server-3/enp2s1", "leaf-1/E1/2"),
        unbundled("control-1/enp2s1", "leaf-3/E1/5"),
        Connection::from_spec(ConnMclagDomain {
            peer_links: vec![SwitchToSwitchLink::new("leaf-1/E1/30", "leaf-2/E1/30")],
            session_links: vec![SwitchToSwitchLink::new("leaf-1/E1/31", "leaf-2/E1/31")],
        }),
        fabric("spine-1/E1/1", "leaf-1/E1/49"),
        fabric("spine-1/E1/2", "leaf-2/E1/49"),
        fabric("spine-1/E1/3", "leaf-3/E1/49"),
        Connection::from_spec(ConnExternal {
            link: ExternalLink {
                switch: "border-1/E1/1".to_string(),
            },
        }),
        Connection::from_spec(static_external()),
    ]
}

// ============================================================================
// VPC policy
// ============================================================================

pub fn vpc_1() -> Vpc {
    Vpc::new(
        "vpc-1",
        VpcSpec::default()
            .with_subnet(
                "subnet-1",
                Subnet::new("10.0.1.0/24", 1001).with_gateway("10.0.1.1"),
            )
            .with_subnet("subnet-2", Subnet::new("10.0.2.0/24", 1002))
            .with_subnet(
                "subnet-3",
                Subnet::new("10.0.3.0/24", 1003).with_isolated(true),
            ),
    )
}

pub fn vpc_2() -> Vpc {
    Vpc::new(
        "vpc-2",
        VpcSpec::default()
            .with_subnet("subnet-1", Subnet::new("10.0.11.0/24", 1011))
            .with_subnet("subnet-2", Subnet::new("10.0.12.0/24", 1012)),
    )
}

pub fn vpc_3() -> Vpc {
    Vpc::new(
        "vpc-3",
        VpcSpec::default().with_subnet("subnet-1", Subnet::new("10.0.21.0/24", 1021)),
    )
}

/// `{vpc-1: [subnet-1], vpc-2: []}`, optionally scoped to a switch group
pub fn vpc_peering(remote: Option<&str>) -> VpcPeering {
    let mut spec =
        VpcPeeringSpec::default().with_permit([("vpc-1", vec!["subnet-1"]), ("vpc-2", vec![])]);
    if let Some(remote) = remote {
        spec = spec.with_remote(remote);
    }
    VpcPeering::new(VPC_PEERING, spec)
}

pub fn vpc_attachments() -> Vec<VpcAttachment> {
    vec![
        VpcAttachment::new("server-1--vpc-1--subnet-1", SERVER_1_CONN, "vpc-1/subnet-1"),
        VpcAttachment::new("server-2--vpc-2--subnet-1", SERVER_2_CONN, "vpc-2/subnet-1")
            .with_native_vlan(true),
        VpcAttachment::new("server-3--vpc-3--subnet-1", SERVER_3_CONN, "vpc-3/subnet-1"),
    ]
}

pub fn external() -> External {
    External::bgp(EXTERNAL, "65102:5000", "50000:50001")
}

pub fn external_attachment() -> ExternalAttachment {
    ExternalAttachment::new(EXTERNAL_ATTACHMENT, EXTERNAL, EXTERNAL_CONN)
        .with_neighbor(64102, "100.100.0.6")
}

pub fn external_peering() -> ExternalPeering {
    ExternalPeering::new(
        EXTERNAL_PEERING,
        "vpc-1",
        ["subnet-1"],
        EXTERNAL,
        ["0.0.0.0/0"],
    )
}

// ============================================================================
// Store
// ============================================================================

/// Store holding the whole reference fabric
pub async fn reference_fabric() -> Arc<MemoryStore> {
    init_tracing();
    let store = Arc::new(MemoryStore::new());

    for switch in switches() {
        store.apply(switch).await.expect("switch fixture");
    }
    for group in ["border", "empty"] {
        store
            .apply(SwitchGroup::new(group))
            .await
            .expect("switch group fixture");
    }
    for server in servers() {
        store.apply(server).await.expect("server fixture");
    }
    for conn in connections() {
        store.apply(conn).await.expect("connection fixture");
    }

    store
        .apply(VlanNamespace::new("default", vec![VlanRange::new(1000, 2999)]))
        .await
        .expect("VLAN namespace fixture");
    store
        .apply(VlanNamespace::new(
            TENANT_VLAN_NAMESPACE,
            vec![VlanRange::new(3000, 3099)],
        ))
        .await
        .expect("VLAN namespace fixture");
    store
        .apply(Ipv4Namespace::new("default", ["10.0.0.0/16"]))
        .await
        .expect("IPv4 namespace fixture");

    for vpc in [vpc_1(), vpc_2(), vpc_3()] {
        store.apply(vpc).await.expect("VPC fixture");
    }
    for attachment in vpc_attachments() {
        store.apply(attachment).await.expect("VPC attachment fixture");
    }
    store
        .apply(vpc_peering(None))
        .await
        .expect("VPC peering fixture");

    store.apply(external()).await.expect("external fixture");
    store
        .apply(external_attachment())
        .await
        .expect("external attachment fixture");
    store
        .apply(external_peering())
        .await
        .expect("external peering fixture");

    store
}

pub fn engine(store: &Arc<MemoryStore>) -> ReachabilityEngine {
    ReachabilityEngine::new(store.clone(), FabricConfig::default())
}

pub fn attachment_index(store: &Arc<MemoryStore>) -> AttachmentIndex {
    AttachmentIndex::new(store.clone(), FabricConfig::default())
}

pub fn validation(store: &Arc<MemoryStore>) -> ValidationService {
    ValidationService::new(store.clone(), FabricConfig::default())
}
