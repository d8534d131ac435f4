// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC attachments bind a server-facing connection to a VPC subnet

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::FabricError;
use crate::labels::{LabelSet, Labels, Relation};
use crate::objects::ObjectMeta;

/// Subnet identifier across VPCs, `vpc/subnet`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetKey {
    pub vpc: String,
    pub subnet: String,
}

impl SubnetKey {
    pub fn new(vpc: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            vpc: vpc.into(),
            subnet: subnet.into(),
        }
    }
}

impl FromStr for SubnetKey {
    type Err = FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((vpc, subnet))
                if !vpc.is_empty() && !subnet.is_empty() && !subnet.contains('/') =>
            {
                Ok(Self::new(vpc, subnet))
            }
            _ => Err(FabricError::structural(format!(
                "invalid subnet {s:?}, expected vpc/subnet"
            ))),
        }
    }
}

impl fmt::Display for SubnetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vpc, self.subnet)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcAttachmentSpec {
    pub connection: String,
    /// `vpc/subnet`
    pub subnet: String,
    #[serde(default)]
    pub native_vlan: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcAttachment {
    pub meta: ObjectMeta,
    pub spec: VpcAttachmentSpec,
}

impl VpcAttachment {
    pub fn new(
        name: impl Into<String>,
        connection: impl Into<String>,
        subnet: impl Into<String>,
    ) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: VpcAttachmentSpec {
                connection: connection.into(),
                subnet: subnet.into(),
                native_vlan: false,
            },
        }
    }

    pub fn with_native_vlan(mut self, native_vlan: bool) -> Self {
        self.spec.native_vlan = native_vlan;
        self
    }

    pub fn subnet_key(&self) -> Result<SubnetKey, FabricError> {
        self.spec.subnet.parse()
    }

    pub(crate) fn labels(&self) -> Labels {
        let mut labels =
            LabelSet::new().relation(Relation::Connection, self.spec.connection.clone());
        if let Ok(key) = self.subnet_key() {
            labels = labels.relation(Relation::Vpc, key.vpc);
        }
        labels.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::FabricObject;

    #[test]
    fn test_subnet_key_parse() {
        let key: SubnetKey = "vpc-1/subnet-1".parse().unwrap();
        assert_eq!(key, SubnetKey::new("vpc-1", "subnet-1"));
        assert_eq!(key.to_string(), "vpc-1/subnet-1");

        for bad in ["vpc-1", "/subnet-1", "vpc-1/", "vpc-1/a/b"] {
            assert!(bad.parse::<SubnetKey>().unwrap_err().is_structural(), "{bad}");
        }
    }

    #[test]
    fn test_attachment_labels() {
        let att = VpcAttachment::new("att-1", "server-1--mclag--leaf-1--leaf-2", "vpc-1/subnet-1");
        let labels = att.derive_labels();
        assert!(labels.contains_key("connection.server-1--mclag--leaf-1--leaf-2"));
        assert!(labels.contains_key("vpc.vpc-1"));
    }
}
