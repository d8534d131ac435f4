// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Object Invariants
//!
//! Validation of a single fabric object without looking at the store.
//! Cross-object rules (referenced objects exist, ports are not reused,
//! redundancy groups agree) live in [`crate::service::validation`].
//!
//! # Invariant Categories
//!
//! 1. **Structural Invariants**: addresses, CIDRs and VLAN ids parse
//! 2. **Uniqueness Invariants**: VLANs and prefixes do not collide inside one object
//! 3. **Policy Invariants**: permit groups and peerings are well formed
//!
//! All functions are pure and deterministic.

use ipnet::Ipv4Net;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use crate::domain::vlan::{self, VlanError, VlanId};
use crate::errors::{FabricError, FabricResult};
use crate::vpc::{ExternalPeering, Vpc, VpcPeering};
use crate::wiring::{ConnStaticExternal, Connection, Endpoints, VlanNamespace};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// VPC declares no subnets
    #[error("VPC must have at least one subnet")]
    NoSubnets,

    /// Subnet fields do not parse or are out of range
    #[error("Invalid subnet {subnet}: {reason}")]
    InvalidSubnet { subnet: String, reason: String },

    /// Two subnets of one VPC share a VLAN
    #[error("VLAN {vlan} is used by both subnet {first} and subnet {second}")]
    DuplicateVlan {
        vlan: u16,
        first: String,
        second: String,
    },

    /// Two subnets of one VPC overlap
    #[error("Subnet {first} overlaps subnet {second}")]
    SubnetOverlap { first: String, second: String },

    /// Permit group is malformed
    #[error("Invalid permit group: {0}")]
    InvalidPermit(String),

    /// Static route is malformed
    #[error("Invalid static route: {0}")]
    InvalidRoute(String),

    /// VLAN namespace declares no ranges
    #[error("VLAN namespace must have at least one range")]
    NoRanges,

    /// VLAN range set is malformed or overlapping
    #[error(transparent)]
    VlanRanges(#[from] VlanError),

    /// Peering is malformed
    #[error("Invalid peering: {0}")]
    InvalidPeering(String),

    /// Address or prefix does not parse
    #[error("Invalid address {value}: {reason}")]
    InvalidAddress { value: String, reason: String },
}

impl From<ValidationError> for FabricError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::VlanRanges(inner) => inner.into(),
            other => FabricError::structural_with_cause("object validation failed", other),
        }
    }
}

fn parse_net(value: &str) -> Result<Ipv4Net, ValidationError> {
    value
        .parse::<Ipv4Net>()
        .map_err(|e| ValidationError::InvalidAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_addr(value: &str) -> Result<Ipv4Addr, ValidationError> {
    value
        .parse::<Ipv4Addr>()
        .map_err(|e| ValidationError::InvalidAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn nets_overlap(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(b) || b.contains(a)
}

/// Validate a VPC in isolation
///
/// # Rules
/// - At least one subnet
/// - Every subnet CIDR parses; a gateway, when set, lies inside it
/// - Every VLAN is a valid id and unique within the VPC
/// - Subnets do not overlap
/// - Permit groups have at least two distinct members, all of them subnets of the VPC
/// - Static route prefixes and next hops parse
pub fn validate_vpc(vpc: &Vpc) -> ValidationResult {
    if vpc.spec.subnets.is_empty() {
        return Err(ValidationError::NoSubnets);
    }

    let mut nets: Vec<(&str, Ipv4Net)> = Vec::with_capacity(vpc.spec.subnets.len());
    let mut vlans: BTreeMap<u16, &str> = BTreeMap::new();

    for (name, subnet) in &vpc.spec.subnets {
        let invalid = |reason: String| ValidationError::InvalidSubnet {
            subnet: name.clone(),
            reason,
        };

        let net = parse_net(&subnet.subnet).map_err(|e| invalid(e.to_string()))?;
        if let Some(gateway) = &subnet.gateway {
            let gateway = parse_addr(gateway).map_err(|e| invalid(e.to_string()))?;
            if !net.contains(&gateway) {
                return Err(invalid(format!("gateway {gateway} is outside {net}")));
            }
        }

        VlanId::new(subnet.vlan).map_err(|e| invalid(e.to_string()))?;
        if let Some(first) = vlans.insert(subnet.vlan, name) {
            return Err(ValidationError::DuplicateVlan {
                vlan: subnet.vlan,
                first: first.to_string(),
                second: name.clone(),
            });
        }

        if let Some((other, _)) = nets.iter().find(|(_, other)| nets_overlap(other, &net)) {
            return Err(ValidationError::SubnetOverlap {
                first: other.to_string(),
                second: name.clone(),
            });
        }
        nets.push((name.as_str(), net));
    }

    for group in &vpc.spec.permit {
        if group.len() < 2 {
            return Err(ValidationError::InvalidPermit(format!(
                "{group:?} must have at least two subnets"
            )));
        }
        let unique: BTreeSet<&String> = group.iter().collect();
        if unique.len() != group.len() {
            return Err(ValidationError::InvalidPermit(format!(
                "{group:?} lists a subnet twice"
            )));
        }
        if let Some(unknown) = group.iter().find(|s| !vpc.has_subnet(s)) {
            return Err(ValidationError::InvalidPermit(format!(
                "unknown subnet {unknown}"
            )));
        }
    }

    for route in &vpc.spec.static_routes {
        parse_net(&route.prefix).map_err(|e| ValidationError::InvalidRoute(e.to_string()))?;
        if route.next_hops.is_empty() {
            return Err(ValidationError::InvalidRoute(format!(
                "{} has no next hops",
                route.prefix
            )));
        }
        for hop in &route.next_hops {
            parse_addr(hop).map_err(|e| ValidationError::InvalidRoute(e.to_string()))?;
        }
    }

    Ok(())
}

/// Validate a VLAN namespace
///
/// # Rules
/// - At least one range
/// - Bounds in 1-4094, `from <= to`
/// - Ranges do not overlap each other
pub fn validate_vlan_namespace(ns: &VlanNamespace) -> ValidationResult {
    if ns.spec.ranges.is_empty() {
        return Err(ValidationError::NoRanges);
    }
    vlan::normalize(&ns.spec.ranges)?;
    vlan::check_overlap(&ns.spec.ranges)?;
    Ok(())
}

/// Validate a VPC peering
///
/// # Rules
/// - At least one permit entry
/// - Each entry names exactly two VPCs
/// - All entries name the same pair
pub fn validate_vpc_peering(peering: &VpcPeering) -> ValidationResult {
    let mut pair: Option<BTreeSet<&str>> = None;

    if peering.spec.permit.is_empty() {
        return Err(ValidationError::InvalidPeering(
            "at least one permit entry is required".to_string(),
        ));
    }

    for entry in &peering.spec.permit {
        let vpcs: BTreeSet<&str> = entry.keys().map(String::as_str).collect();
        if vpcs.len() != 2 {
            return Err(ValidationError::InvalidPeering(format!(
                "permit entry must name exactly two VPCs, found {}",
                vpcs.len()
            )));
        }
        match &pair {
            Some(existing) if *existing != vpcs => {
                return Err(ValidationError::InvalidPeering(format!(
                    "permit entries name different VPC pairs: {existing:?} and {vpcs:?}"
                )));
            }
            Some(_) => {}
            None => pair = Some(vpcs),
        }
    }

    Ok(())
}

/// Validate an external peering
///
/// # Rules
/// - VPC and External are named
/// - At least one VPC subnet is granted
/// - Every prefix parses as a CIDR
pub fn validate_external_peering(peering: &ExternalPeering) -> ValidationResult {
    if peering.vpc().is_empty() || peering.external().is_empty() {
        return Err(ValidationError::InvalidPeering(
            "VPC and External must be named".to_string(),
        ));
    }
    if peering.spec.permit.vpc.subnets.is_empty() {
        return Err(ValidationError::InvalidPeering(
            "at least one VPC subnet is required".to_string(),
        ));
    }
    for prefix in peering.prefixes() {
        parse_net(prefix)?;
    }
    Ok(())
}

/// Validate the addressing of a static external link
pub fn validate_static_external(conn: &ConnStaticExternal) -> ValidationResult {
    parse_net(&conn.link.ip)?;
    for subnet in &conn.link.subnets {
        parse_net(subnet)?;
    }
    if let Some(next_hop) = &conn.link.next_hop {
        parse_addr(next_hop)?;
    }
    Ok(())
}

/// Validate a connection and return its endpoints
///
/// Covers variant count, port names and cardinality, plus static external
/// addressing.
pub fn validate_connection(conn: &Connection) -> FabricResult<Endpoints> {
    let endpoints = conn.endpoints()?;
    if let Some(static_external) = &conn.spec.static_external {
        validate_static_external(static_external)?;
    }
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vlan::VlanRange;
    use crate::vpc::{StaticRoute, Subnet, VpcPeeringSpec, VpcSpec};
    use crate::wiring::{StaticExternalLink, ConnUnbundled, ServerToSwitchLink};

    fn vpc() -> VpcSpec {
        VpcSpec::default()
            .with_subnet("subnet-1", Subnet::new("10.0.1.0/24", 1001).with_gateway("10.0.1.1"))
            .with_subnet("subnet-2", Subnet::new("10.0.2.0/24", 1002))
    }

    #[test]
    fn test_validate_vpc_valid() {
        let spec = vpc().with_permit(["subnet-1", "subnet-2"]).with_static_route(StaticRoute {
            prefix: "192.168.0.0/16".to_string(),
            next_hops: vec!["10.0.1.254".to_string()],
        });
        assert!(validate_vpc(&Vpc::new("vpc-1", spec)).is_ok());
    }

    #[test]
    fn test_validate_vpc_invalid() {
        // No subnets
        assert_eq!(
            validate_vpc(&Vpc::new("vpc-1", VpcSpec::default())),
            Err(ValidationError::NoSubnets)
        );

        // Duplicate VLAN
        let spec = vpc().with_subnet("subnet-3", Subnet::new("10.0.3.0/24", 1001));
        assert!(matches!(
            validate_vpc(&Vpc::new("vpc-1", spec)),
            Err(ValidationError::DuplicateVlan { vlan: 1001, .. })
        ));

        // Overlapping subnets
        let spec = vpc().with_subnet("subnet-3", Subnet::new("10.0.0.0/16", 1003));
        assert!(matches!(
            validate_vpc(&Vpc::new("vpc-1", spec)),
            Err(ValidationError::SubnetOverlap { .. })
        ));

        // Gateway outside subnet
        let spec = vpc().with_subnet("subnet-3", Subnet::new("10.0.3.0/24", 1003).with_gateway("10.0.4.1"));
        assert!(matches!(
            validate_vpc(&Vpc::new("vpc-1", spec)),
            Err(ValidationError::InvalidSubnet { .. })
        ));

        // VLAN out of range
        let spec = vpc().with_subnet("subnet-3", Subnet::new("10.0.3.0/24", 4095));
        assert!(validate_vpc(&Vpc::new("vpc-1", spec)).is_err());
    }

    #[test]
    fn test_validate_vpc_permit_groups() {
        for group in [vec!["subnet-1"], vec!["subnet-1", "subnet-1"], vec!["subnet-1", "subnet-9"]] {
            let spec = vpc().with_permit(group);
            assert!(matches!(
                validate_vpc(&Vpc::new("vpc-1", spec)),
                Err(ValidationError::InvalidPermit(_))
            ));
        }
    }

    #[test]
    fn test_validate_vlan_namespace() {
        let ok = VlanNamespace::new("default", vec![VlanRange::new(1000, 1999), VlanRange::single(3000)]);
        assert!(validate_vlan_namespace(&ok).is_ok());

        let overlapping = VlanNamespace::new("default", vec![VlanRange::new(1000, 1999), VlanRange::new(1500, 2500)]);
        let err = validate_vlan_namespace(&overlapping).unwrap_err();
        assert!(FabricError::from(err).is_relationship_violation());

        assert_eq!(
            validate_vlan_namespace(&VlanNamespace::new("empty", vec![])),
            Err(ValidationError::NoRanges)
        );
    }

    #[test]
    fn test_validate_vpc_peering() {
        let ok = VpcPeering::new(
            "vpc-1--vpc-2",
            VpcPeeringSpec::default()
                .with_permit([("vpc-1", vec!["subnet-1"]), ("vpc-2", vec![])])
                .with_permit([("vpc-1", vec![]), ("vpc-2", vec!["subnet-2"])]),
        );
        assert!(validate_vpc_peering(&ok).is_ok());

        let three = VpcPeering::new(
            "p",
            VpcPeeringSpec::default().with_permit([("vpc-1", vec![]), ("vpc-2", vec![]), ("vpc-3", vec![])]),
        );
        assert!(validate_vpc_peering(&three).is_err());

        let mixed = VpcPeering::new(
            "p",
            VpcPeeringSpec::default()
                .with_permit([("vpc-1", vec![]), ("vpc-2", vec![])])
                .with_permit([("vpc-1", vec![]), ("vpc-3", vec![])]),
        );
        assert!(validate_vpc_peering(&mixed).is_err());

        assert!(validate_vpc_peering(&VpcPeering::new("p", VpcPeeringSpec::default())).is_err());
    }

    #[test]
    fn test_validate_external_peering() {
        let ok = ExternalPeering::new("p", "vpc-1", ["subnet-1"], "ext-1", ["0.0.0.0/0"]);
        assert!(validate_external_peering(&ok).is_ok());

        let no_subnets = ExternalPeering::new("p", "vpc-1", Vec::<String>::new(), "ext-1", ["0.0.0.0/0"]);
        assert!(validate_external_peering(&no_subnets).is_err());

        let bad_prefix = ExternalPeering::new("p", "vpc-1", ["subnet-1"], "ext-1", ["0.0.0.0/33"]);
        assert!(matches!(
            validate_external_peering(&bad_prefix),
            Err(ValidationError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_validate_connection() {
        let conn = Connection::from_spec(ConnUnbundled {
            link: ServerToSwitchLink::new("server-1/enp2s1", "leaf-1/E1/1"),
            mtu: None,
        });
        assert_eq!(validate_connection(&conn).unwrap().ports.len(), 2);

        let conn = Connection::from_spec(ConnStaticExternal {
            link: StaticExternalLink {
                switch: "border-1/E1/10".to_string(),
                ip: "172.31.0.1/24".to_string(),
                subnets: vec!["10.99.0.0/16".to_string(), "bogus".to_string()],
                next_hop: None,
                vlan: None,
            },
            within_vpc: None,
        });
        assert!(validate_connection(&conn).unwrap_err().is_structural());
    }
}
