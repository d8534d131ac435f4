// Copyright (c) 2025 - Cowboy AI, Inc.
//! Externals: networks outside the fabric, where they attach and which VPC
//! subnets may reach them

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::labels::{LabelSet, Labels, Relation};
use crate::errors::FabricResult;
use crate::objects::ObjectMeta;

/// L2 external: directly connected prefixes instead of BGP
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalL2 {
    pub ip: String,
    pub gateway_ip: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub vlan: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSpec {
    #[serde(default)]
    pub ipv4_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l2: Option<ExternalL2>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct External {
    pub meta: ObjectMeta,
    pub spec: ExternalSpec,
}

impl External {
    /// BGP external tagged by communities
    pub fn bgp(
        name: impl Into<String>,
        inbound_community: impl Into<String>,
        outbound_community: impl Into<String>,
    ) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: ExternalSpec {
                inbound_community: Some(inbound_community.into()),
                outbound_community: Some(outbound_community.into()),
                ..Default::default()
            },
        }
    }

    pub fn is_l2(&self) -> bool {
        self.spec.l2.is_some()
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttachmentSwitch {
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttachmentNeighbor {
    pub asn: u32,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttachmentSpec {
    pub external: String,
    pub connection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch: Option<ExternalAttachmentSwitch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbor: Option<ExternalAttachmentNeighbor>,
}

/// Binds an External connection to an External
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttachment {
    pub meta: ObjectMeta,
    pub spec: ExternalAttachmentSpec,
}

impl ExternalAttachment {
    pub fn new(
        name: impl Into<String>,
        external: impl Into<String>,
        connection: impl Into<String>,
    ) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec: ExternalAttachmentSpec {
                external: external.into(),
                connection: connection.into(),
                ..Default::default()
            },
        }
    }

    pub fn with_neighbor(mut self, asn: u32, ip: impl Into<String>) -> Self {
        self.spec.neighbor = Some(ExternalAttachmentNeighbor { asn, ip: ip.into() });
        self
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new()
            .relation(Relation::External, self.spec.external.clone())
            .relation(Relation::Connection, self.spec.connection.clone())
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPeeringVpc {
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPeeringExternal {
    pub name: String,
    /// External prefixes the VPC subnets may reach
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPeeringPermit {
    pub vpc: ExternalPeeringVpc,
    pub external: ExternalPeeringExternal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPeeringSpec {
    pub permit: ExternalPeeringPermit,
}

/// Grants named subnets of one VPC reachability to an External's prefixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPeering {
    pub meta: ObjectMeta,
    pub spec: ExternalPeeringSpec,
}

impl ExternalPeering {
    pub fn new<S, P>(
        name: impl Into<String>,
        vpc: impl Into<String>,
        subnets: S,
        external: impl Into<String>,
        prefixes: P,
    ) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            meta: ObjectMeta::new(name),
            spec: ExternalPeeringSpec {
                permit: ExternalPeeringPermit {
                    vpc: ExternalPeeringVpc {
                        name: vpc.into(),
                        subnets: subnets.into_iter().map(Into::into).collect(),
                    },
                    external: ExternalPeeringExternal {
                        name: external.into(),
                        prefixes: prefixes.into_iter().map(Into::into).collect(),
                    },
                },
            },
        }
    }

    pub fn vpc(&self) -> &str {
        &self.spec.permit.vpc.name
    }

    pub fn external(&self) -> &str {
        &self.spec.permit.external.name
    }

    pub fn prefixes(&self) -> &[String] {
        &self.spec.permit.external.prefixes
    }

    pub fn allows_subnet(&self, subnet: &str) -> bool {
        self.spec.permit.vpc.subnets.iter().any(|s| s == subnet)
    }

    /// Destination advertised verbatim as one of the prefixes
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefixes().iter().any(|p| p == prefix)
    }

    /// Destination address covered by one of the prefixes
    pub fn covers(&self, ip: Ipv4Addr) -> FabricResult<bool> {
        for prefix in self.prefixes() {
            if prefix.parse::<Ipv4Net>()?.contains(&ip) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new()
            .relation(Relation::Vpc, self.vpc().to_string())
            .relation(Relation::External, self.external().to_string())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::FabricObject;

    fn peering() -> ExternalPeering {
        ExternalPeering::new("vpc-1--ext-1", "vpc-1", ["subnet-1"], "ext-1", ["10.99.0.0/16", "0.0.0.0/0"])
    }

    #[test]
    fn test_exact_prefix_match_is_string_equality() {
        let peering = peering();
        assert!(peering.has_prefix("10.99.0.0/16"));
        assert!(!peering.has_prefix("10.99.1.0/24"));
    }

    #[test]
    fn test_ip_match_is_containment() {
        let peering = peering();
        assert!(peering.covers("8.8.8.8".parse().unwrap()).unwrap());

        let narrow = ExternalPeering::new("p", "vpc-1", ["subnet-1"], "ext-1", ["10.99.0.0/16"]);
        assert!(narrow.covers("10.99.3.4".parse().unwrap()).unwrap());
        assert!(!narrow.covers("10.98.3.4".parse().unwrap()).unwrap());
    }

    #[test]
    fn test_bad_prefix_is_structural() {
        let bad = ExternalPeering::new("p", "vpc-1", ["subnet-1"], "ext-1", ["nope"]);
        assert!(bad.covers("8.8.8.8".parse().unwrap()).unwrap_err().is_structural());
    }

    #[test]
    fn test_labels() {
        let labels = peering().derive_labels();
        assert!(labels.contains_key("vpc.vpc-1"));
        assert!(labels.contains_key("external.ext-1"));

        let att = ExternalAttachment::new("att", "ext-1", "border-1--external");
        let labels = att.derive_labels();
        assert!(labels.contains_key("external.ext-1"));
        assert!(labels.contains_key("connection.border-1--external"));
    }
}
