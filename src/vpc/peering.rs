// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC peering
//!
//! A peering names exactly two VPCs. Each permit entry maps both VPC names
//! to the subnets it grants; an empty subnet list is a wildcard over all
//! subnets of that VPC.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::labels::{LabelSet, Labels, Relation};
use crate::objects::ObjectMeta;

/// Subnets of one VPC granted by a permit entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeeringSubnets {
    #[serde(default)]
    pub subnets: Vec<String>,
}

impl VpcPeeringSubnets {
    pub fn allows(&self, subnet: &str) -> bool {
        self.subnets.is_empty() || self.subnets.iter().any(|s| s == subnet)
    }
}

/// VPC name to granted subnets
pub type PermitEntry = BTreeMap<String, VpcPeeringSubnets>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeeringSpec {
    #[serde(default)]
    pub permit: Vec<PermitEntry>,
    /// Switch group the peering is scoped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl VpcPeeringSpec {
    /// Add a permit entry from `(vpc, subnets)` pairs
    pub fn with_permit<'a, I>(mut self, entry: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let entry = entry
            .into_iter()
            .map(|(vpc, subnets)| {
                (
                    vpc.to_string(),
                    VpcPeeringSubnets {
                        subnets: subnets.into_iter().map(str::to_string).collect(),
                    },
                )
            })
            .collect();
        self.permit.push(entry);
        self
    }

    pub fn with_remote(mut self, group: impl Into<String>) -> Self {
        self.remote = Some(group.into());
        self
    }

    /// Every VPC named by any permit entry
    pub fn vpcs(&self) -> BTreeSet<&str> {
        self.permit
            .iter()
            .flat_map(|entry| entry.keys().map(String::as_str))
            .collect()
    }

    /// First permit entry naming both VPCs and allowing both subnets
    pub fn permits(&self, vpc1: &str, subnet1: &str, vpc2: &str, subnet2: &str) -> bool {
        self.permit.iter().any(|entry| {
            match (entry.get(vpc1), entry.get(vpc2)) {
                (Some(side1), Some(side2)) => side1.allows(subnet1) && side2.allows(subnet2),
                _ => false,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeering {
    pub meta: ObjectMeta,
    pub spec: VpcPeeringSpec,
}

impl VpcPeering {
    pub fn new(name: impl Into<String>, spec: VpcPeeringSpec) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec,
        }
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new()
            .relations(Relation::Vpc, self.spec.vpcs())
            .build()
    }
}
