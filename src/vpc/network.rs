// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPCs, subnets and IPv4 namespaces
//!
//! The within-VPC reachability rule lives here as a pure method on [`Vpc`]:
//! it needs nothing but the VPC object itself.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::errors::{FabricError, FabricResult};
use crate::labels::{LabelSet, Labels};
use crate::objects::{Kind, ObjectMeta};
use crate::vpc::attachment::SubnetKey;

/// A VPC subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// IPv4 CIDR of the subnet
    pub subnet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    pub vlan: u16,
    /// Overrides the VPC `default_isolated` flag when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolated: Option<bool>,
    /// Overrides the VPC `default_restricted` flag when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,
}

impl Subnet {
    pub fn new(cidr: impl Into<String>, vlan: u16) -> Self {
        Self {
            subnet: cidr.into(),
            gateway: None,
            vlan,
            isolated: None,
            restricted: None,
        }
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = Some(gateway.into());
        self
    }

    pub fn with_isolated(mut self, isolated: bool) -> Self {
        self.isolated = Some(isolated);
        self
    }

    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = Some(restricted);
        self
    }

    /// Parsed CIDR with host bits cleared
    pub fn cidr(&self) -> FabricResult<Ipv4Net> {
        Ok(self.subnet.parse::<Ipv4Net>()?.trunc())
    }

    pub fn gateway_addr(&self) -> FabricResult<Option<Ipv4Addr>> {
        self.gateway
            .as_deref()
            .map(|gateway| gateway.parse::<Ipv4Addr>().map_err(FabricError::from))
            .transpose()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    pub prefix: String,
    #[serde(default)]
    pub next_hops: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcSpec {
    #[serde(default)]
    pub subnets: BTreeMap<String, Subnet>,
    #[serde(default)]
    pub default_isolated: bool,
    #[serde(default)]
    pub default_restricted: bool,
    /// Groups of subnet names granted mutual reachability
    #[serde(default)]
    pub permit: Vec<Vec<String>>,
    #[serde(default)]
    pub static_routes: Vec<StaticRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_namespace: Option<String>,
}

impl VpcSpec {
    pub fn with_subnet(mut self, name: impl Into<String>, subnet: Subnet) -> Self {
        self.subnets.insert(name.into(), subnet);
        self
    }

    pub fn with_default_isolated(mut self, isolated: bool) -> Self {
        self.default_isolated = isolated;
        self
    }

    pub fn with_default_restricted(mut self, restricted: bool) -> Self {
        self.default_restricted = restricted;
        self
    }

    pub fn with_permit<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permit.push(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_static_route(mut self, route: StaticRoute) -> Self {
        self.static_routes.push(route);
        self
    }

    pub fn with_vlan_namespace(mut self, name: impl Into<String>) -> Self {
        self.vlan_namespace = Some(name.into());
        self
    }

    pub fn with_ipv4_namespace(mut self, name: impl Into<String>) -> Self {
        self.ipv4_namespace = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub meta: ObjectMeta,
    pub spec: VpcSpec,
}

impl Vpc {
    pub fn new(name: impl Into<String>, spec: VpcSpec) -> Self {
        Self {
            meta: ObjectMeta::new(name),
            spec,
        }
    }

    /// Subnet by name; absence is a `NotFound` on the `vpc/subnet` key
    pub fn subnet(&self, name: &str) -> FabricResult<&Subnet> {
        self.spec.subnets.get(name).ok_or_else(|| {
            FabricError::not_found(
                Kind::Vpc,
                self.meta.namespace.clone(),
                SubnetKey::new(self.meta.name.clone(), name).to_string(),
            )
        })
    }

    pub fn has_subnet(&self, name: &str) -> bool {
        self.spec.subnets.contains_key(name)
    }

    pub fn subnet_names(&self) -> impl Iterator<Item = &str> {
        self.spec.subnets.keys().map(String::as_str)
    }

    pub fn is_subnet_isolated(&self, name: &str) -> FabricResult<bool> {
        Ok(self.subnet(name)?.isolated.unwrap_or(self.spec.default_isolated))
    }

    pub fn is_subnet_restricted(&self, name: &str) -> FabricResult<bool> {
        Ok(self
            .subnet(name)?
            .restricted
            .unwrap_or(self.spec.default_restricted))
    }

    /// Whether some permit group lists both subnets
    pub fn permits(&self, subnet1: &str, subnet2: &str) -> bool {
        self.spec.permit.iter().any(|group| {
            group.iter().any(|s| s == subnet1) && group.iter().any(|s| s == subnet2)
        })
    }

    /// Within-VPC reachability between two subnets of this VPC
    ///
    /// A subnet reaches itself unless restricted. Two different subnets
    /// reach each other when neither is isolated, or when a permit group
    /// contains both.
    pub fn is_subnet_reachable_within(&self, subnet1: &str, subnet2: &str) -> FabricResult<bool> {
        if subnet1 == subnet2 {
            return Ok(!self.is_subnet_restricted(subnet1)?);
        }

        let isolated1 = self.is_subnet_isolated(subnet1)?;
        let isolated2 = self.is_subnet_isolated(subnet2)?;
        if !isolated1 && !isolated2 {
            return Ok(true);
        }

        Ok(self.permits(subnet1, subnet2))
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4NamespaceSpec {
    pub subnets: Vec<String>,
}

/// IPv4 address space VPC subnets are carved from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Namespace {
    pub meta: ObjectMeta,
    pub spec: Ipv4NamespaceSpec,
}

impl Ipv4Namespace {
    pub fn new<I, S>(name: impl Into<String>, subnets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            meta: ObjectMeta::new(name),
            spec: Ipv4NamespaceSpec {
                subnets: subnets.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Whether `net` lies entirely inside one of the namespace prefixes
    pub fn contains(&self, net: &Ipv4Net) -> FabricResult<bool> {
        for prefix in &self.spec.subnets {
            if prefix.parse::<Ipv4Net>()?.contains(net) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn labels(&self) -> Labels {
        LabelSet::new().build()
    }
}
