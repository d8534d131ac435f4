// Copyright (c) 2025 - Cowboy AI, Inc.
//! Switches, switch groups and VLAN namespaces

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::vlan::{self, VlanRange};
use crate::labels::{LabelSet, Labels, Relation};
use crate::objects::ObjectMeta;

/// Switch role in the spine-leaf fabric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchRole {
    Spine,
    #[default]
    ServerLeaf,
    BorderLeaf,
    MixedLeaf,
}

impl SwitchRole {
    pub fn is_spine(&self) -> bool {
        matches!(self, SwitchRole::Spine)
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_spine()
    }
}

impl fmt::Display for SwitchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchRole::Spine => write!(f, "spine"),
            SwitchRole::ServerLeaf => write!(f, "server-leaf"),
            SwitchRole::BorderLeaf => write!(f, "border-leaf"),
            SwitchRole::MixedLeaf => write!(f, "mixed-leaf"),
        }
    }
}

/// Redundancy mechanism of a switch group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedundancyType {
    #[default]
    None,
    Mclag,
    Eslag,
}

impl fmt::Display for RedundancyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedundancyType::None => write!(f, "none"),
            RedundancyType::Mclag => write!(f, "mclag"),
            RedundancyType::Eslag => write!(f, "eslag"),
        }
    }
}

/// Redundancy group membership of a switch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redundancy {
    #[serde(default)]
    pub group: String,
    #[serde(default, rename = "type")]
    pub redundancy_type: RedundancyType,
}

impl Redundancy {
    pub fn new(group: impl Into<String>, redundancy_type: RedundancyType) -> Self {
        Self {
            group: group.into(),
            redundancy_type,
        }
    }

    pub fn is_set(&self) -> bool {
        !self.group.is_empty() && self.redundancy_type != RedundancyType::None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSpec {
    #[serde(default)]
    pub role: SwitchRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Switch groups this switch is a member of
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub redundancy: Redundancy,
    #[serde(default)]
    pub vlan_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub spec: SwitchSpec,
}

impl Switch {
    pub fn new(name: impl Into<String>, spec: SwitchSpec) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec,
        }
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, SwitchSpec::default())
    }

    pub fn spine(name: impl Into<String>) -> Self {
        Self::new(
            name,
            SwitchSpec {
                role: SwitchRole::Spine,
                ..Default::default()
            },
        )
    }

    pub fn with_redundancy(
        mut self,
        group: impl Into<String>,
        redundancy_type: RedundancyType,
    ) -> Self {
        self.spec.redundancy = Redundancy::new(group, redundancy_type);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.spec.groups.push(group.into());
        self
    }

    pub fn with_vlan_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.spec.vlan_namespaces.push(namespace.into());
        self
    }

    pub(crate) fn labels(&self) -> Labels {
        let mut labels =
            LabelSet::new().relations(Relation::Group, self.spec.groups.iter().cloned());
        if !self.spec.redundancy.group.is_empty() {
            labels = labels.relation(Relation::Redundancy, self.spec.redundancy.group.clone());
        }
        labels.build()
    }
}

/// Switch group; membership is declared on the switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchGroupSpec {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchGroup {
    pub meta: ObjectMeta,
    #[serde(default)]
    pub spec: SwitchGroupSpec,
}

impl SwitchGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: SwitchGroupSpec::default(),
        }
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanNamespaceSpec {
    pub ranges: Vec<VlanRange>,
}

/// Partition of the VLAN id space available to VPC subnets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanNamespace {
    pub meta: ObjectMeta,
    pub spec: VlanNamespaceSpec,
}

impl VlanNamespace {
    pub fn new(name: impl Into<String>, ranges: Vec<VlanRange>) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: VlanNamespaceSpec { ranges },
        }
    }

    /// Whether `vlan` is inside one of the namespace ranges
    pub fn contains(&self, vlan: u16) -> bool {
        vlan::ranges_contain(&self.spec.ranges, vlan)
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}
