// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cross-object validation
//!
//! Checks an object against the rest of the store before it is admitted.
//! Each check returns the first violation: a referenced object that does
//! not exist is `NotFound`, an inconsistency between existing objects is a
//! `RelationshipViolation`. Per-object rules run first, see
//! [`crate::domain::invariants`].

use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::FabricConfig;
use crate::domain::invariants;
use crate::domain::vlan;
use crate::domain::PortName;
use crate::errors::{FabricError, FabricResult};
use crate::labels::{LabelSelector, Relation};
use crate::store::{self, ObjectReader};
use crate::vpc::{
    External, ExternalAttachment, ExternalPeering, Ipv4Namespace, Vpc, VpcAttachment, VpcPeering,
};
use crate::wiring::{
    Connection, ConnectionType, Endpoints, Server, Switch, SwitchGroup, Topology, VlanNamespace,
};

/// Report the first port used by two connections
///
/// Connections whose endpoints cannot be derived are rejected as structural
/// errors.
pub fn check_port_uniqueness(connections: &[Connection]) -> FabricResult<()> {
    let mut owners: BTreeMap<String, &str> = BTreeMap::new();
    for conn in connections {
        for port in conn.endpoints()?.ports {
            if let Some(owner) = owners.get(&port) {
                if *owner != conn.meta.name {
                    return Err(FabricError::relationship(format!(
                        "port {port} is used by both connection {owner} and connection {}",
                        conn.meta.name
                    )));
                }
            }
            owners.insert(port, &conn.meta.name);
        }
    }
    Ok(())
}

/// All switches of an MCLAG, ESLAG or MCLAG domain connection must share
/// one redundancy group whose type matches the connection
pub fn check_redundancy(connection_type: ConnectionType, switches: &[Switch]) -> FabricResult<()> {
    let Some(required) = connection_type.required_redundancy() else {
        return Ok(());
    };

    let mut group: Option<&str> = None;
    for switch in switches {
        let redundancy = &switch.spec.redundancy;
        if redundancy.group.is_empty() || redundancy.redundancy_type != required {
            return Err(FabricError::relationship(format!(
                "{connection_type} connection: switch {} must be in a {required} redundancy group",
                switch.meta.name
            )));
        }
        match group {
            Some(group) if group != redundancy.group => {
                return Err(FabricError::relationship(format!(
                    "{connection_type} connection: switches are in different redundancy groups {group} and {}",
                    redundancy.group
                )));
            }
            Some(_) => {}
            None => group = Some(redundancy.group.as_str()),
        }
    }
    Ok(())
}

/// Store-backed validation of fabric objects
#[derive(Clone)]
pub struct ValidationService {
    reader: Arc<dyn ObjectReader>,
    config: FabricConfig,
}

impl ValidationService {
    pub fn new(reader: Arc<dyn ObjectReader>, config: FabricConfig) -> Self {
        Self { reader, config }
    }

    fn reader(&self) -> &dyn ObjectReader {
        self.reader.as_ref()
    }

    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    async fn switches(&self, endpoints: &Endpoints) -> FabricResult<Vec<Switch>> {
        try_join_all(
            endpoints
                .switches
                .iter()
                .map(|name| store::get::<Switch>(self.reader(), self.namespace(), name)),
        )
        .await
    }

    /// Connections sharing at least one device with `endpoints`
    async fn neighbors(&self, endpoints: &Endpoints) -> FabricResult<BTreeMap<String, Connection>> {
        let selectors: Vec<LabelSelector> = endpoints
            .switches
            .iter()
            .map(|name| LabelSelector::related(Relation::Switch, name.clone()))
            .chain(
                endpoints
                    .servers
                    .iter()
                    .map(|name| LabelSelector::related(Relation::Server, name.clone())),
            )
            .collect();

        let listed = try_join_all(
            selectors
                .iter()
                .map(|selector| {
                    store::list::<Connection>(self.reader(), self.namespace(), selector)
                }),
        )
        .await?;

        Ok(listed
            .into_iter()
            .flatten()
            .map(|conn| (conn.meta.name.clone(), conn))
            .collect())
    }

    /// Validate a connection against the devices and connections it touches
    pub async fn validate_connection(&self, conn: &Connection) -> FabricResult<()> {
        let endpoints = invariants::validate_connection(conn)?;
        let topology = conn.spec.topology()?;

        let (switches, _servers) = futures::try_join!(
            self.switches(&endpoints),
            try_join_all(
                endpoints
                    .servers
                    .iter()
                    .map(|name| store::get::<Server>(self.reader(), self.namespace(), name)),
            )
        )?;

        for (name, other) in self.neighbors(&endpoints).await? {
            if name == conn.meta.name {
                continue;
            }
            let other_endpoints = other.endpoints()?;
            let shared = endpoints.shared_ports(&other_endpoints).next().cloned();
            if let Some(port) = shared {
                return Err(FabricError::relationship(format!(
                    "port {port} is already used by connection {name}"
                )));
            }
        }

        check_redundancy(topology.connection_type(), &switches)?;

        if let Topology::Fabric(fabric) = topology {
            let roles: BTreeMap<&str, &Switch> =
                switches.iter().map(|s| (s.meta.name.as_str(), s)).collect();
            for link in &fabric.links {
                let spine = PortName::new(&link.spine)?;
                let leaf = PortName::new(&link.leaf)?;
                if !roles.get(spine.device()).is_some_and(|s| s.spec.role.is_spine()) {
                    return Err(FabricError::relationship(format!(
                        "fabric connection: {} is not a spine",
                        spine.device()
                    )));
                }
                if !roles.get(leaf.device()).is_some_and(|s| s.spec.role.is_leaf()) {
                    return Err(FabricError::relationship(format!(
                        "fabric connection: {} is not a leaf",
                        leaf.device()
                    )));
                }
            }
        }

        debug!("Connection {} is valid", conn.meta.name);
        Ok(())
    }

    /// Validate a VLAN namespace and re-check every switch that declares it
    ///
    /// Namespaces may overlap each other; only the namespaces declared by a
    /// single switch must be disjoint.
    pub async fn validate_vlan_namespace(&self, ns: &VlanNamespace) -> FabricResult<()> {
        invariants::validate_vlan_namespace(ns)?;

        let switches: Vec<Switch> =
            store::list(self.reader(), self.namespace(), &LabelSelector::new()).await?;
        for switch in switches
            .iter()
            .filter(|s| s.spec.vlan_namespaces.contains(&ns.meta.name))
        {
            self.check_switch_vlan_namespaces(switch, Some(ns)).await?;
        }
        Ok(())
    }

    /// Validate a switch against its groups, VLAN namespaces and
    /// redundancy peers
    pub async fn validate_switch(&self, switch: &Switch) -> FabricResult<()> {
        try_join_all(
            switch
                .spec
                .groups
                .iter()
                .map(|group| store::get::<SwitchGroup>(self.reader(), self.namespace(), group)),
        )
        .await?;

        self.check_switch_vlan_namespaces(switch, None).await?;
        self.check_redundancy_peers(switch).await?;

        debug!("Switch {} is valid", switch.meta.name);
        Ok(())
    }

    /// The VLAN namespaces a switch declares must not overlap; `proposed`
    /// stands in for the stored namespace of the same name
    async fn check_switch_vlan_namespaces(
        &self,
        switch: &Switch,
        proposed: Option<&VlanNamespace>,
    ) -> FabricResult<()> {
        let declared = try_join_all(switch.spec.vlan_namespaces.iter().map(|name| async move {
            match proposed {
                Some(ns) if ns.meta.name == *name => Ok(ns.clone()),
                _ => store::get::<VlanNamespace>(self.reader(), self.namespace(), name).await,
            }
        }))
        .await?;

        let combined: Vec<_> = declared
            .iter()
            .flat_map(|ns| ns.spec.ranges.iter().copied())
            .collect();
        vlan::check_overlap(&combined).map_err(|e| {
            FabricError::relationship(format!(
                "switch {} declares overlapping VLAN namespaces: {e}",
                switch.meta.name
            ))
        })
    }

    /// Switches sharing a redundancy group must agree on its type
    async fn check_redundancy_peers(&self, switch: &Switch) -> FabricResult<()> {
        let redundancy = &switch.spec.redundancy;
        if redundancy.group.is_empty() {
            return Ok(());
        }

        let peers: Vec<Switch> = store::list(
            self.reader(),
            self.namespace(),
            &LabelSelector::related(Relation::Redundancy, redundancy.group.clone()),
        )
        .await?;
        for peer in peers.iter().filter(|p| p.meta.name != switch.meta.name) {
            if peer.spec.redundancy.redundancy_type != redundancy.redundancy_type {
                return Err(FabricError::relationship(format!(
                    "switch {} is {} in redundancy group {} but peer {} is {}",
                    switch.meta.name,
                    redundancy.redundancy_type,
                    redundancy.group,
                    peer.meta.name,
                    peer.spec.redundancy.redundancy_type
                )));
            }
        }
        Ok(())
    }

    /// Validate a VPC against its VLAN and IPv4 namespaces
    pub async fn validate_vpc(&self, vpc: &Vpc) -> FabricResult<()> {
        invariants::validate_vpc(vpc)?;

        let vlan_ns_name = self
            .config
            .vlan_namespace_or_default(vpc.spec.vlan_namespace.as_deref());
        let ipv4_ns_name = self
            .config
            .ipv4_namespace_or_default(vpc.spec.ipv4_namespace.as_deref());

        let (vlan_ns, ipv4_ns) = futures::try_join!(
            store::get::<VlanNamespace>(self.reader(), self.namespace(), vlan_ns_name),
            store::get::<Ipv4Namespace>(self.reader(), self.namespace(), ipv4_ns_name)
        )?;

        for (name, subnet) in &vpc.spec.subnets {
            if !vlan_ns.contains(subnet.vlan) {
                return Err(FabricError::relationship(format!(
                    "subnet {name} VLAN {} is outside VLAN namespace {}",
                    subnet.vlan, vlan_ns.meta.name
                )));
            }
            if !ipv4_ns.contains(&subnet.cidr()?)? {
                return Err(FabricError::relationship(format!(
                    "subnet {name} {} is outside IPv4 namespace {}",
                    subnet.subnet, ipv4_ns.meta.name
                )));
            }
        }
        Ok(())
    }

    /// Validate a VPC attachment: subnet exists, connection is server facing
    pub async fn validate_vpc_attachment(&self, attachment: &VpcAttachment) -> FabricResult<()> {
        let key = attachment.subnet_key()?;

        let (vpc, conn) = futures::try_join!(
            store::get::<Vpc>(self.reader(), self.namespace(), &key.vpc),
            store::get::<Connection>(self.reader(), self.namespace(), &attachment.spec.connection)
        )?;
        vpc.subnet(&key.subnet)?;

        let connection_type = conn.connection_type()?;
        if !connection_type.is_server_facing() {
            return Err(FabricError::relationship(format!(
                "VPC attachment {} needs a server-facing connection, {} is {connection_type}",
                attachment.meta.name, conn.meta.name
            )));
        }
        Ok(())
    }

    /// Validate a VPC peering: VPCs and named subnets exist, remote group exists
    pub async fn validate_vpc_peering(&self, peering: &VpcPeering) -> FabricResult<()> {
        invariants::validate_vpc_peering(peering)?;

        let vpcs = try_join_all(
            peering
                .spec
                .vpcs()
                .into_iter()
                .map(|name| store::get::<Vpc>(self.reader(), self.namespace(), name)),
        )
        .await?;
        let vpcs: BTreeMap<&str, &Vpc> = vpcs.iter().map(|v| (v.meta.name.as_str(), v)).collect();

        for entry in &peering.spec.permit {
            for (vpc_name, side) in entry {
                let Some(vpc) = vpcs.get(vpc_name.as_str()) else {
                    continue;
                };
                for subnet in &side.subnets {
                    vpc.subnet(subnet)?;
                }
            }
        }

        if let Some(remote) = &peering.spec.remote {
            if store::find::<SwitchGroup>(self.reader(), self.namespace(), remote)
                .await?
                .is_none()
            {
                return Err(FabricError::relationship(format!(
                    "VPC peering {} is scoped to unknown switch group {remote}",
                    peering.meta.name
                )));
            }
        }
        Ok(())
    }

    /// Validate an external attachment: External exists, connection is an External link
    pub async fn validate_external_attachment(
        &self,
        attachment: &ExternalAttachment,
    ) -> FabricResult<()> {
        let (_, conn) = futures::try_join!(
            store::get::<External>(self.reader(), self.namespace(), &attachment.spec.external),
            store::get::<Connection>(self.reader(), self.namespace(), &attachment.spec.connection)
        )?;

        let connection_type = conn.connection_type()?;
        if connection_type != ConnectionType::External {
            return Err(FabricError::relationship(format!(
                "external attachment {} needs an external connection, {} is {connection_type}",
                attachment.meta.name, conn.meta.name
            )));
        }
        Ok(())
    }

    /// Validate an external peering: VPC, its granted subnets and the External exist
    pub async fn validate_external_peering(&self, peering: &ExternalPeering) -> FabricResult<()> {
        invariants::validate_external_peering(peering)?;

        let (vpc, _) = futures::try_join!(
            store::get::<Vpc>(self.reader(), self.namespace(), peering.vpc()),
            store::get::<External>(self.reader(), self.namespace(), peering.external())
        )?;
        for subnet in &peering.spec.permit.vpc.subnets {
            vpc.subnet(subnet)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiring::{ConnMclag, ConnUnbundled, RedundancyType, ServerToSwitchLink};

    fn unbundled(server: &str, switch: &str) -> Connection {
        Connection::from_spec(ConnUnbundled {
            link: ServerToSwitchLink::new(server, switch),
            mtu: None,
        })
    }

    #[test]
    fn test_port_uniqueness() {
        let ok = [
            unbundled("server-1/enp2s1", "leaf-1/E1/1"),
            unbundled("server-2/enp2s1", "leaf-1/E1/2"),
        ];
        assert!(check_port_uniqueness(&ok).is_ok());

        let clash = [
            unbundled("server-1/enp2s1", "leaf-1/E1/1"),
            unbundled("server-2/enp2s1", "leaf-1/E1/1"),
        ];
        let err = check_port_uniqueness(&clash).unwrap_err();
        assert!(err.is_relationship_violation());
        assert!(err.to_string().contains("leaf-1/E1/1"));
    }

    #[test]
    fn test_redundancy_consistency() {
        let conn = ConnMclag {
            links: vec![
                ServerToSwitchLink::new("server-1/p1", "leaf-1/E1/1"),
                ServerToSwitchLink::new("server-1/p2", "leaf-2/E1/1"),
            ],
            mtu: None,
            fallback: false,
        };
        let connection_type = Connection::from_spec(conn).connection_type().unwrap();

        let good = [
            Switch::leaf("leaf-1").with_redundancy("mclag-1", RedundancyType::Mclag),
            Switch::leaf("leaf-2").with_redundancy("mclag-1", RedundancyType::Mclag),
        ];
        assert!(check_redundancy(connection_type, &good).is_ok());

        let split = [
            Switch::leaf("leaf-1").with_redundancy("mclag-1", RedundancyType::Mclag),
            Switch::leaf("leaf-2").with_redundancy("mclag-2", RedundancyType::Mclag),
        ];
        assert!(check_redundancy(connection_type, &split).unwrap_err().is_relationship_violation());

        let wrong_type = [
            Switch::leaf("leaf-1").with_redundancy("mclag-1", RedundancyType::Eslag),
            Switch::leaf("leaf-2").with_redundancy("mclag-1", RedundancyType::Eslag),
        ];
        assert!(check_redundancy(connection_type, &wrong_type).is_err());

        let none = [Switch::leaf("leaf-1"), Switch::leaf("leaf-2")];
        assert!(check_redundancy(connection_type, &none).is_err());
        assert!(check_redundancy(ConnectionType::Bundled, &none).is_ok());
    }
}
