// Copyright (c) 2025 - Cowboy AI, Inc.
//! Connection Topology
//!
//! A connection is one of nine link topologies between devices. On the wire
//! a [`ConnectionSpec`] carries one optional field per topology; exactly one
//! must be set. [`ConnectionSpec::topology`] resolves it into the closed
//! [`Topology`] enum, and every derived attribute (type, endpoints, name,
//! link summary) is an exhaustive match over that enum.
//!
//! # Cardinality
//!
//! | Topology      | Switches | Servers | Ports                          |
//! |---------------|----------|---------|--------------------------------|
//! | unbundled     | 1        | 1       | 2                              |
//! | bundled       | 1        | 1       | 2 × links                      |
//! | mclag         | 2        | 1       | 2 × links                      |
//! | eslag         | 2-4      | 1       | 2 × links                      |
//! | mclag-domain  | 2        | 0       | 2 × (peer + session links)     |
//! | fabric        | 2        | 0       | 2 × links                      |
//! | vpc-loopback  | 1        | 0       | 2 × links                      |
//! | external      | 1        | 0       | 1                              |
//! | static-external | 1      | 0       | 1                              |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

use crate::domain::port::{PortName, PORT_SEPARATOR};
use crate::errors::{FabricError, FabricResult};
use crate::labels::{LabelSet, Labels, Relation, CONNECTION_TYPE_LABEL};
use crate::objects::ObjectMeta;
use crate::wiring::switch::RedundancyType;

/// Name generated for a spec that does not resolve to a single topology
pub const INVALID_CONNECTION_NAME: &str = "<invalid>";

/// Maximum number of switches in an ESLAG connection
pub const ESLAG_MAX_SWITCHES: usize = 4;

/// Connection type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    Unbundled,
    Bundled,
    Mclag,
    Eslag,
    MclagDomain,
    Fabric,
    VpcLoopback,
    External,
    StaticExternal,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Unbundled => "unbundled",
            ConnectionType::Bundled => "bundled",
            ConnectionType::Mclag => "mclag",
            ConnectionType::Eslag => "eslag",
            ConnectionType::MclagDomain => "mclag-domain",
            ConnectionType::Fabric => "fabric",
            ConnectionType::VpcLoopback => "vpc-loopback",
            ConnectionType::External => "external",
            ConnectionType::StaticExternal => "static-external",
        }
    }

    /// Connects a server to one or more switches
    pub fn is_server_facing(&self) -> bool {
        matches!(
            self,
            ConnectionType::Unbundled
                | ConnectionType::Bundled
                | ConnectionType::Mclag
                | ConnectionType::Eslag
        )
    }

    /// Redundancy type every participating switch must report
    pub fn required_redundancy(&self) -> Option<RedundancyType> {
        match self {
            ConnectionType::Mclag | ConnectionType::MclagDomain => Some(RedundancyType::Mclag),
            ConnectionType::Eslag => Some(RedundancyType::Eslag),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Links
// ============================================================================

/// Server port wired to a switch port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerToSwitchLink {
    pub server: String,
    pub switch: String,
}

impl ServerToSwitchLink {
    pub fn new(server: impl Into<String>, switch: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            switch: switch.into(),
        }
    }
}

/// Switch port wired to another switch port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchToSwitchLink {
    pub switch1: String,
    pub switch2: String,
}

impl SwitchToSwitchLink {
    pub fn new(switch1: impl Into<String>, switch2: impl Into<String>) -> Self {
        Self {
            switch1: switch1.into(),
            switch2: switch2.into(),
        }
    }
}

/// Spine port wired to a leaf port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricLink {
    pub spine: String,
    pub leaf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spine_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_ip: Option<String>,
}

impl FabricLink {
    pub fn new(spine: impl Into<String>, leaf: impl Into<String>) -> Self {
        Self {
            spine: spine.into(),
            leaf: leaf.into(),
            spine_ip: None,
            leaf_ip: None,
        }
    }
}

/// Switch port facing an external BGP peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub switch: String,
}

/// Switch port facing a statically routed external network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticExternalLink {
    pub switch: String,
    /// Interface address on the switch port, CIDR notation
    pub ip: String,
    /// Prefixes reachable through this port
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
}

// ============================================================================
// Topologies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnUnbundled {
    pub link: ServerToSwitchLink,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnBundled {
    pub links: Vec<ServerToSwitchLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnMclag {
    pub links: Vec<ServerToSwitchLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnEslag {
    pub links: Vec<ServerToSwitchLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnMclagDomain {
    pub peer_links: Vec<SwitchToSwitchLink>,
    pub session_links: Vec<SwitchToSwitchLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnFabric {
    pub links: Vec<FabricLink>,
}

/// Port pair on a single switch looped back as a hardware workaround
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnVpcLoopback {
    pub links: Vec<SwitchToSwitchLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnExternal {
    pub link: ExternalLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnStaticExternal {
    pub link: StaticExternalLink,
    /// VPC whose forwarding context the external is routed into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within_vpc: Option<String>,
}

/// Connection spec as stored: one optional field per topology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unbundled: Option<ConnUnbundled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundled: Option<ConnBundled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mclag: Option<ConnMclag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eslag: Option<ConnEslag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mclag_domain: Option<ConnMclagDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<ConnFabric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_loopback: Option<ConnVpcLoopback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ConnExternal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_external: Option<ConnStaticExternal>,
}

macro_rules! spec_from {
    ($($conn:ident => $field:ident),+ $(,)?) => {
        $(
            impl From<$conn> for ConnectionSpec {
                fn from(conn: $conn) -> Self {
                    ConnectionSpec {
                        $field: Some(conn),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

spec_from!(
    ConnUnbundled => unbundled,
    ConnBundled => bundled,
    ConnMclag => mclag,
    ConnEslag => eslag,
    ConnMclagDomain => mclag_domain,
    ConnFabric => fabric,
    ConnVpcLoopback => vpc_loopback,
    ConnExternal => external,
    ConnStaticExternal => static_external,
);

/// Resolved connection topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology<'a> {
    Unbundled(&'a ConnUnbundled),
    Bundled(&'a ConnBundled),
    Mclag(&'a ConnMclag),
    Eslag(&'a ConnEslag),
    MclagDomain(&'a ConnMclagDomain),
    Fabric(&'a ConnFabric),
    VpcLoopback(&'a ConnVpcLoopback),
    External(&'a ConnExternal),
    StaticExternal(&'a ConnStaticExternal),
}

impl ConnectionSpec {
    /// Resolve the single populated topology
    pub fn topology(&self) -> FabricResult<Topology<'_>> {
        let candidates = [
            self.unbundled.as_ref().map(Topology::Unbundled),
            self.bundled.as_ref().map(Topology::Bundled),
            self.mclag.as_ref().map(Topology::Mclag),
            self.eslag.as_ref().map(Topology::Eslag),
            self.mclag_domain.as_ref().map(Topology::MclagDomain),
            self.fabric.as_ref().map(Topology::Fabric),
            self.vpc_loopback.as_ref().map(Topology::VpcLoopback),
            self.external.as_ref().map(Topology::External),
            self.static_external.as_ref().map(Topology::StaticExternal),
        ];

        let mut set = candidates.into_iter().flatten();
        match (set.next(), set.next()) {
            (Some(topology), None) => Ok(topology),
            _ => Err(FabricError::structural(
                "exactly one connection type must be used",
            )),
        }
    }

    pub fn connection_type(&self) -> FabricResult<ConnectionType> {
        Ok(self.topology()?.connection_type())
    }

    pub fn endpoints(&self) -> FabricResult<Endpoints> {
        self.topology()?.endpoints()
    }

    /// Deterministic name from participant devices, or [`INVALID_CONNECTION_NAME`]
    pub fn generate_name(&self) -> String {
        self.topology()
            .map(|topology| topology.generate_name())
            .unwrap_or_else(|_| INVALID_CONNECTION_NAME.to_string())
    }

    pub fn link_summary(&self) -> FabricResult<Vec<String>> {
        Ok(self.topology()?.link_summary())
    }
}

impl Topology<'_> {
    pub fn connection_type(&self) -> ConnectionType {
        match self {
            Topology::Unbundled(_) => ConnectionType::Unbundled,
            Topology::Bundled(_) => ConnectionType::Bundled,
            Topology::Mclag(_) => ConnectionType::Mclag,
            Topology::Eslag(_) => ConnectionType::Eslag,
            Topology::MclagDomain(_) => ConnectionType::MclagDomain,
            Topology::Fabric(_) => ConnectionType::Fabric,
            Topology::VpcLoopback(_) => ConnectionType::VpcLoopback,
            Topology::External(_) => ConnectionType::External,
            Topology::StaticExternal(_) => ConnectionType::StaticExternal,
        }
    }

    /// Port pairs in declaration order; single-port topologies pair with nothing
    pub fn port_pairs(&self) -> Vec<(&str, Option<&str>)> {
        fn server_links(links: &[ServerToSwitchLink]) -> Vec<(&str, Option<&str>)> {
            links
                .iter()
                .map(|l| (l.server.as_str(), Some(l.switch.as_str())))
                .collect()
        }
        fn switch_links<'l>(
            links: impl IntoIterator<Item = &'l SwitchToSwitchLink>,
        ) -> Vec<(&'l str, Option<&'l str>)> {
            links
                .into_iter()
                .map(|l| (l.switch1.as_str(), Some(l.switch2.as_str())))
                .collect()
        }

        match self {
            Topology::Unbundled(conn) => server_links(std::slice::from_ref(&conn.link)),
            Topology::Bundled(conn) => server_links(&conn.links),
            Topology::Mclag(conn) => server_links(&conn.links),
            Topology::Eslag(conn) => server_links(&conn.links),
            Topology::MclagDomain(conn) => {
                switch_links(conn.peer_links.iter().chain(conn.session_links.iter()))
            }
            Topology::Fabric(conn) => conn
                .links
                .iter()
                .map(|l| (l.spine.as_str(), Some(l.leaf.as_str())))
                .collect(),
            Topology::VpcLoopback(conn) => switch_links(&conn.links),
            Topology::External(conn) => vec![(conn.link.switch.as_str(), None)],
            Topology::StaticExternal(conn) => vec![(conn.link.switch.as_str(), None)],
        }
    }

    /// Derive the endpoint sets and check topology-specific cardinality
    pub fn endpoints(&self) -> FabricResult<Endpoints> {
        let mut collector = Collector::new(self.connection_type());

        match self {
            Topology::Unbundled(conn) => {
                collector.server_links(std::slice::from_ref(&conn.link))?;
                collector.expect_switches(1..=1)?;
                collector.expect_servers(1..=1)?;
                collector.expect_ports(2)?;
            }
            Topology::Bundled(conn) => {
                collector.server_links(&conn.links)?;
                collector.expect_switches(1..=1)?;
                collector.expect_servers(1..=1)?;
                collector.expect_ports(2 * conn.links.len())?;
            }
            Topology::Mclag(conn) => {
                collector.server_links(&conn.links)?;
                collector.expect_switches(2..=2)?;
                collector.expect_servers(1..=1)?;
                collector.expect_ports(2 * conn.links.len())?;
            }
            Topology::Eslag(conn) => {
                collector.server_links(&conn.links)?;
                collector.expect_switches(2..=ESLAG_MAX_SWITCHES)?;
                collector.expect_servers(1..=1)?;
                collector.expect_ports(2 * conn.links.len())?;
            }
            Topology::MclagDomain(conn) => {
                if conn.peer_links.is_empty() {
                    return Err(collector.error("at least one peer link is required"));
                }
                if conn.session_links.is_empty() {
                    return Err(collector.error("at least one session link is required"));
                }
                collector.switch_links(&conn.peer_links)?;
                collector.switch_links(&conn.session_links)?;
                collector.expect_switches(2..=2)?;
                collector.expect_ports(2 * (conn.peer_links.len() + conn.session_links.len()))?;
            }
            Topology::Fabric(conn) => {
                collector.fabric_links(&conn.links)?;
                collector.expect_switches(2..=2)?;
                collector.expect_ports(2 * conn.links.len())?;
            }
            Topology::VpcLoopback(conn) => {
                collector.switch_links(&conn.links)?;
                collector.expect_switches(1..=1)?;
                collector.expect_ports(2 * conn.links.len())?;
            }
            Topology::External(conn) => {
                collector.switch_port(&conn.link.switch)?;
                collector.expect_switches(1..=1)?;
                collector.expect_ports(1)?;
            }
            Topology::StaticExternal(conn) => {
                collector.switch_port(&conn.link.switch)?;
                collector.expect_switches(1..=1)?;
                collector.expect_ports(1)?;
            }
        }

        Ok(collector.endpoints)
    }

    /// `<left>--<type>[--<right>...]` from the participant device names
    pub fn generate_name(&self) -> String {
        fn first_server_link(links: &[ServerToSwitchLink]) -> (Option<&str>, Vec<&str>) {
            (
                links.first().and_then(|l| device_of(&l.server)),
                links.iter().filter_map(|l| device_of(&l.switch)).collect(),
            )
        }

        let (left, mut right): (Option<&str>, Vec<&str>) = match self {
            Topology::Unbundled(conn) => (
                device_of(&conn.link.server),
                device_of(&conn.link.switch).into_iter().collect(),
            ),
            Topology::Bundled(conn) => first_server_link(&conn.links),
            Topology::Mclag(conn) => first_server_link(&conn.links),
            Topology::Eslag(conn) => first_server_link(&conn.links),
            Topology::MclagDomain(conn) => (
                conn.peer_links.first().and_then(|l| device_of(&l.switch1)),
                conn.peer_links
                    .first()
                    .and_then(|l| device_of(&l.switch2))
                    .into_iter()
                    .collect(),
            ),
            Topology::Fabric(conn) => (
                conn.links.first().and_then(|l| device_of(&l.spine)),
                conn.links
                    .first()
                    .and_then(|l| device_of(&l.leaf))
                    .into_iter()
                    .collect(),
            ),
            Topology::VpcLoopback(conn) => (
                conn.links.first().and_then(|l| device_of(&l.switch1)),
                Vec::new(),
            ),
            Topology::External(conn) => (device_of(&conn.link.switch), Vec::new()),
            Topology::StaticExternal(conn) => (device_of(&conn.link.switch), Vec::new()),
        };

        let Some(left) = left else {
            return INVALID_CONNECTION_NAME.to_string();
        };

        right.sort_unstable();
        right.dedup();

        let role = self.connection_type();
        if right.is_empty() {
            format!("{left}--{role}")
        } else {
            format!("{left}--{role}--{}", right.join("--"))
        }
    }

    /// One `a <-> b` entry per link, in declaration order
    pub fn link_summary(&self) -> Vec<String> {
        self.port_pairs()
            .into_iter()
            .map(|(left, right)| match right {
                Some(right) => format!("{left} <-> {right}"),
                None => left.to_string(),
            })
            .collect()
    }
}

fn device_of(port: &str) -> Option<&str> {
    port.split_once(PORT_SEPARATOR)
        .map(|(device, _)| device)
        .filter(|device| !device.is_empty())
}

// ============================================================================
// Endpoints
// ============================================================================

/// Devices and ports a connection touches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub switches: BTreeSet<String>,
    pub servers: BTreeSet<String>,
    pub ports: BTreeSet<String>,
    /// Port to peer port, for two-ended links
    pub links: BTreeMap<String, String>,
}

impl Endpoints {
    /// Local port names of `server` touched by the connection
    pub fn server_interfaces(&self, server: &str) -> Vec<String> {
        let prefix = format!("{server}{PORT_SEPARATOR}");
        self.ports
            .iter()
            .filter_map(|port| port.strip_prefix(&prefix))
            .map(str::to_string)
            .collect()
    }

    /// Ports shared with another endpoint set
    pub fn shared_ports<'a>(&'a self, other: &'a Endpoints) -> impl Iterator<Item = &'a String> {
        self.ports.intersection(&other.ports)
    }
}

struct Collector {
    connection_type: ConnectionType,
    endpoints: Endpoints,
    port_count: usize,
}

impl Collector {
    fn new(connection_type: ConnectionType) -> Self {
        Self {
            connection_type,
            endpoints: Endpoints::default(),
            port_count: 0,
        }
    }

    fn error(&self, message: impl fmt::Display) -> FabricError {
        FabricError::structural(format!("{} connection: {}", self.connection_type, message))
    }

    fn port(&mut self, port: &str) -> FabricResult<PortName> {
        let parsed = PortName::new(port)?;
        self.port_count += 1;
        self.endpoints.ports.insert(port.to_string());
        Ok(parsed)
    }

    fn switch_port(&mut self, port: &str) -> FabricResult<()> {
        let parsed = self.port(port)?;
        self.endpoints.switches.insert(parsed.device().to_string());
        Ok(())
    }

    fn server_port(&mut self, port: &str) -> FabricResult<()> {
        let parsed = self.port(port)?;
        self.endpoints.servers.insert(parsed.device().to_string());
        Ok(())
    }

    fn link(&mut self, left: &str, right: &str) {
        self.endpoints
            .links
            .insert(left.to_string(), right.to_string());
    }

    fn require_links(&self, count: usize) -> FabricResult<()> {
        if count == 0 {
            return Err(self.error("at least one link is required"));
        }
        Ok(())
    }

    fn server_links(&mut self, links: &[ServerToSwitchLink]) -> FabricResult<()> {
        self.require_links(links.len())?;
        for link in links {
            self.server_port(&link.server)?;
            self.switch_port(&link.switch)?;
            self.link(&link.server, &link.switch);
        }
        Ok(())
    }

    fn switch_links(&mut self, links: &[SwitchToSwitchLink]) -> FabricResult<()> {
        self.require_links(links.len())?;
        for link in links {
            self.switch_port(&link.switch1)?;
            self.switch_port(&link.switch2)?;
            self.link(&link.switch1, &link.switch2);
        }
        Ok(())
    }

    fn fabric_links(&mut self, links: &[FabricLink]) -> FabricResult<()> {
        self.require_links(links.len())?;
        let mut spines = BTreeSet::new();
        let mut leaves = BTreeSet::new();
        for link in links {
            self.switch_port(&link.spine)?;
            self.switch_port(&link.leaf)?;
            self.link(&link.spine, &link.leaf);
            spines.extend(device_of(&link.spine));
            leaves.extend(device_of(&link.leaf));
        }
        if spines.len() != 1 || leaves.len() != 1 {
            return Err(self.error("all links must connect the same spine and leaf"));
        }
        Ok(())
    }

    fn expect_switches(&self, expected: RangeInclusive<usize>) -> FabricResult<()> {
        expect_count(self, "switch", self.endpoints.switches.len(), expected)
    }

    fn expect_servers(&self, expected: RangeInclusive<usize>) -> FabricResult<()> {
        expect_count(self, "server", self.endpoints.servers.len(), expected)
    }

    fn expect_ports(&self, expected: usize) -> FabricResult<()> {
        if self.endpoints.ports.len() != self.port_count {
            return Err(self.error("ports must be unique"));
        }
        expect_count(self, "port", self.endpoints.ports.len(), expected..=expected)
    }
}

fn expect_count(
    collector: &Collector,
    what: &str,
    actual: usize,
    expected: RangeInclusive<usize>,
) -> FabricResult<()> {
    if expected.contains(&actual) {
        return Ok(());
    }
    let wanted = if expected.start() == expected.end() {
        format!("exactly {}", expected.start())
    } else {
        format!("{}-{}", expected.start(), expected.end())
    };
    Err(collector.error(format!("must have {wanted} {what}(s), found {actual}")))
}

// ============================================================================
// Connection object
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub meta: ObjectMeta,
    pub spec: ConnectionSpec,
}

impl Connection {
    pub fn new(name: impl Into<String>, spec: impl Into<ConnectionSpec>) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: spec.into(),
        }
    }

    /// Connection named by [`ConnectionSpec::generate_name`]
    pub fn from_spec(spec: impl Into<ConnectionSpec>) -> Self {
        let spec = spec.into();
        Self {
            meta: ObjectMeta::new(spec.generate_name()),
            spec,
        }
    }

    pub fn connection_type(&self) -> FabricResult<ConnectionType> {
        self.spec.connection_type()
    }

    /// String tag of the connection type, e.g. `mclag`
    pub fn type_name(&self) -> FabricResult<&'static str> {
        Ok(self.spec.connection_type()?.as_str())
    }

    pub fn endpoints(&self) -> FabricResult<Endpoints> {
        self.spec.endpoints()
    }

    pub fn link_summary(&self) -> FabricResult<Vec<String>> {
        self.spec.link_summary()
    }

    pub fn generate_name(&self) -> String {
        self.spec.generate_name()
    }

    /// Static external routed into `vpc`
    pub fn static_external_within(&self, vpc: &str) -> Option<&ConnStaticExternal> {
        self.spec
            .static_external
            .as_ref()
            .filter(|conn| conn.within_vpc.as_deref() == Some(vpc))
    }

    pub(crate) fn labels(&self) -> Labels {
        let mut labels = LabelSet::new();
        if let Ok(topology) = self.spec.topology() {
            labels = labels.value(CONNECTION_TYPE_LABEL, topology.connection_type().as_str());
            if let Ok(endpoints) = topology.endpoints() {
                labels = labels
                    .relations(Relation::Server, endpoints.servers)
                    .relations(Relation::Switch, endpoints.switches);
            }
            if let Topology::StaticExternal(ConnStaticExternal {
                within_vpc: Some(vpc),
                ..
            }) = topology
            {
                labels = labels.relation(Relation::Vpc, vpc.clone());
            }
        }
        labels.build()
    }
}
