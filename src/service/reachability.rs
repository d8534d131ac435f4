// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reachability Engine
//!
//! Answers "can X reach Y" by composing independent policy layers:
//!
//! 1. Subnet isolation and restriction inside one VPC, with VPC defaults
//!    and permit groups
//! 2. VPC peerings, optionally scoped to a remote switch group
//! 3. External peerings, gated on a live external attachment
//! 4. Static externals routed directly into a VPC
//!
//! Every query re-reads the objects it needs; nothing is cached across
//! calls. Missing objects a query depends on (the VPC being asked about,
//! its subnets) are errors. Missing policy (no peering, no attachment, an
//! empty remote group) is a plain `false`.
//!
//! [`ReachabilityService::get_reachable_from`] is the explainable form of
//! the boolean predicates: each of them is a membership test against the
//! returned [`SubnetReachability`].

use async_trait::async_trait;
use futures::future::try_join_all;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::FabricConfig;
use crate::errors::{FabricError, FabricResult};
use crate::labels::{LabelSelector, Relation, CONNECTION_TYPE_LABEL};
use crate::service::attachment::AttachmentIndex;
use crate::store::{self, ObjectReader};
use crate::vpc::{ExternalAttachment, ExternalPeering, SubnetKey, Vpc, VpcPeering};
use crate::wiring::{Connection, ConnectionType, Switch, SwitchGroup};

/// Source endpoint of a reachability query
///
/// `vpc/subnet` names a subnet directly; anything else names a server whose
/// attached subnets are used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Subnet(SubnetKey),
    Server(String),
}

impl FromStr for Source {
    type Err = FabricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('/') {
            return Ok(Source::Subnet(s.parse()?));
        }
        if s.is_empty() {
            return Err(FabricError::structural("empty reachability source"));
        }
        Ok(Source::Server(s.to_string()))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Subnet(key) => write!(f, "{key}"),
            Source::Server(name) => write!(f, "{name}"),
        }
    }
}

/// Everything one subnet can reach
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetReachability {
    /// Hosts of the subnet reach each other (subnet not restricted)
    pub within_same_subnet: bool,
    /// Other subnets of the same VPC
    pub same_vpc_subnets: BTreeSet<String>,
    /// VPC name to subnets reachable through peering
    pub other_vpc_subnets: BTreeMap<String, BTreeSet<String>>,
    /// External name to sorted, de-duplicated prefixes
    pub external_prefixes: BTreeMap<String, Vec<String>>,
    /// Static external connection name to its routed prefixes
    pub static_externals: BTreeMap<String, Vec<String>>,
}

impl SubnetReachability {
    /// Whether `vpc/subnet` is reachable, given this entry describes a
    /// subnet of `own_vpc` named `own_subnet`
    pub fn reaches(&self, own_vpc: &str, own_subnet: &str, target: &SubnetKey) -> bool {
        if target.vpc == own_vpc {
            if target.subnet == own_subnet {
                return self.within_same_subnet;
            }
            return self.same_vpc_subnets.contains(&target.subnet);
        }
        self.other_vpc_subnets
            .get(&target.vpc)
            .is_some_and(|subnets| subnets.contains(&target.subnet))
    }
}

/// Reachability queries
#[async_trait]
pub trait ReachabilityService: Send + Sync {
    /// Two subnets of one VPC
    async fn is_subnet_reachable_within_vpc(
        &self,
        vpc: &str,
        subnet1: &str,
        subnet2: &str,
    ) -> FabricResult<bool>;

    /// Subnets of two different VPCs through peering
    async fn is_subnet_reachable_between_vpcs(
        &self,
        vpc1: &str,
        subnet1: &str,
        vpc2: &str,
        subnet2: &str,
    ) -> FabricResult<bool>;

    /// Two `vpc/subnet` keys, within or between VPCs
    async fn is_subnet_reachable(&self, source: &str, destination: &str) -> FabricResult<bool>;

    /// Any attached subnet of `source` reaches any attached subnet of `destination`
    async fn is_server_reachable(&self, source: &str, destination: &str) -> FabricResult<bool>;

    /// Destination prefix advertised verbatim by a peered, attached External
    async fn is_external_subnet_reachable(
        &self,
        source: &str,
        destination_prefix: &str,
    ) -> FabricResult<bool>;

    /// Destination address covered by a prefix of a peered, attached External
    async fn is_external_ip_reachable(
        &self,
        source: &str,
        destination_ip: &str,
    ) -> FabricResult<bool>;

    /// Destination address covered by a static external routed into the source VPC
    async fn is_static_external_ip_reachable(
        &self,
        source: &str,
        destination_ip: &str,
    ) -> FabricResult<bool>;

    /// Reachability of every subnet of `vpc`, keyed by subnet name
    async fn get_reachable_from(
        &self,
        vpc: &str,
    ) -> FabricResult<BTreeMap<String, SubnetReachability>>;
}

/// [`ReachabilityService`] over an [`ObjectReader`]
#[derive(Clone)]
pub struct ReachabilityEngine {
    reader: Arc<dyn ObjectReader>,
    config: FabricConfig,
    attachments: AttachmentIndex,
}

impl ReachabilityEngine {
    pub fn new(reader: Arc<dyn ObjectReader>, config: FabricConfig) -> Self {
        let attachments = AttachmentIndex::new(reader.clone(), config.clone());
        Self {
            reader,
            config,
            attachments,
        }
    }

    pub fn attachments(&self) -> &AttachmentIndex {
        &self.attachments
    }

    fn namespace(&self) -> &str {
        &self.config.namespace
    }

    async fn vpc(&self, name: &str) -> FabricResult<Vpc> {
        store::get(self.reader.as_ref(), self.namespace(), name).await
    }

    /// Peerings labeled with both VPCs
    async fn peerings_between(&self, vpc1: &str, vpc2: &str) -> FabricResult<Vec<VpcPeering>> {
        let selector =
            LabelSelector::related(Relation::Vpc, vpc1).with_relation(Relation::Vpc, vpc2);
        store::list(self.reader.as_ref(), self.namespace(), &selector).await
    }

    /// A peering without `remote` is always active; with one, the named
    /// switch group must exist and have at least one member switch
    async fn is_peering_active(&self, peering: &VpcPeering) -> FabricResult<bool> {
        let Some(remote) = &peering.spec.remote else {
            return Ok(true);
        };

        let reader = self.reader.as_ref();
        if store::find::<SwitchGroup>(reader, self.namespace(), remote)
            .await?
            .is_none()
        {
            debug!("Peering {} inactive: switch group {} not found", peering.meta.name, remote);
            return Ok(false);
        }

        let members: Vec<Switch> = store::list(
            reader,
            self.namespace(),
            &LabelSelector::related(Relation::Group, remote.clone()),
        )
        .await?;
        if members.is_empty() {
            debug!("Peering {} inactive: switch group {} is empty", peering.meta.name, remote);
            return Ok(false);
        }

        Ok(true)
    }

    async fn has_external_attachment(&self, external: &str) -> FabricResult<bool> {
        let attachments: Vec<ExternalAttachment> = store::list(
            self.reader.as_ref(),
            self.namespace(),
            &LabelSelector::related(Relation::External, external),
        )
        .await?;
        Ok(attachments.iter().any(|a| a.spec.external == external))
    }

    async fn between(
        &self,
        vpc1: &Vpc,
        subnet1: &str,
        vpc2: &Vpc,
        subnet2: &str,
    ) -> FabricResult<bool> {
        vpc1.subnet(subnet1)?;
        vpc2.subnet(subnet2)?;

        let (name1, name2) = (vpc1.meta.name.as_str(), vpc2.meta.name.as_str());
        for peering in self.peerings_between(name1, name2).await? {
            if !self.is_peering_active(&peering).await? {
                continue;
            }
            if peering.spec.permits(name1, subnet1, name2, subnet2) {
                trace!(
                    "{}/{} reaches {}/{} through peering {}",
                    name1, subnet1, name2, subnet2, peering.meta.name
                );
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn subnet_keys_reachable(
        &self,
        source: &SubnetKey,
        destination: &SubnetKey,
    ) -> FabricResult<bool> {
        if source.vpc == destination.vpc {
            return self
                .is_subnet_reachable_within_vpc(&source.vpc, &source.subnet, &destination.subnet)
                .await;
        }
        self.is_subnet_reachable_between_vpcs(
            &source.vpc,
            &source.subnet,
            &destination.vpc,
            &destination.subnet,
        )
        .await
    }

    /// Subnets a source stands for; subnet sources must exist
    async fn source_subnets(&self, source: &str) -> FabricResult<Vec<SubnetKey>> {
        match source.parse::<Source>()? {
            Source::Subnet(key) => {
                self.vpc(&key.vpc).await?.subnet(&key.subnet)?;
                Ok(vec![key])
            }
            Source::Server(server) => {
                let attached = self.attachments.get_attached_subnets(&server).await?;
                attached.keys().map(|key| key.parse()).collect()
            }
        }
    }

    async fn is_external_reachable<F>(&self, source: &str, matches: F) -> FabricResult<bool>
    where
        F: Fn(&ExternalPeering) -> FabricResult<bool> + Send + Sync,
    {
        for key in self.source_subnets(source).await? {
            let peerings: Vec<ExternalPeering> = store::list(
                self.reader.as_ref(),
                self.namespace(),
                &LabelSelector::related(Relation::Vpc, key.vpc.clone()),
            )
            .await?;

            for peering in peerings {
                if peering.vpc() != key.vpc || !peering.allows_subnet(&key.subnet) {
                    continue;
                }
                if !matches(&peering)? {
                    continue;
                }
                if self.has_external_attachment(peering.external()).await? {
                    trace!(
                        "{} reaches external {} via {}",
                        key,
                        peering.external(),
                        peering.meta.name
                    );
                    return Ok(true);
                }
                debug!(
                    "External {} matched for {} but has no attachment",
                    peering.external(),
                    key
                );
            }
        }
        Ok(false)
    }

    /// Static external connections routed into `vpc`
    async fn static_externals(&self, vpc: &str) -> FabricResult<Vec<Connection>> {
        let selector = LabelSelector::related(Relation::Vpc, vpc)
            .with(CONNECTION_TYPE_LABEL, ConnectionType::StaticExternal.as_str());
        let connections: Vec<Connection> =
            store::list(self.reader.as_ref(), self.namespace(), &selector).await?;
        Ok(connections
            .into_iter()
            .filter(|conn| conn.static_external_within(vpc).is_some())
            .collect())
    }

    /// Other-VPC subnets reachable from each subnet of `vpc` through active peerings
    async fn peered_subnets(
        &self,
        vpc: &Vpc,
    ) -> FabricResult<BTreeMap<String, BTreeMap<String, BTreeSet<String>>>> {
        let name = vpc.meta.name.as_str();
        let peerings: Vec<VpcPeering> = store::list(
            self.reader.as_ref(),
            self.namespace(),
            &LabelSelector::related(Relation::Vpc, name),
        )
        .await?;

        let mut peers: BTreeMap<String, Vpc> = BTreeMap::new();
        let mut reachable: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();

        for peering in peerings {
            if !self.is_peering_active(&peering).await? {
                continue;
            }
            let vpcs = peering.spec.vpcs();
            let Some(other) = vpcs.iter().copied().find(|v| *v != name) else {
                warn!("Peering {} names no VPC other than {}", peering.meta.name, name);
                continue;
            };

            if !peers.contains_key(other) {
                match store::find::<Vpc>(self.reader.as_ref(), self.namespace(), other).await? {
                    Some(found) => {
                        peers.insert(other.to_string(), found);
                    }
                    None => {
                        warn!("Peering {} names unknown VPC {}", peering.meta.name, other);
                        continue;
                    }
                }
            }
            let Some(other_vpc) = peers.get(other) else {
                continue;
            };

            for subnet in vpc.subnet_names() {
                for other_subnet in other_vpc.subnet_names() {
                    if peering.spec.permits(name, subnet, other, other_subnet) {
                        reachable
                            .entry(subnet.to_string())
                            .or_default()
                            .entry(other.to_string())
                            .or_default()
                            .insert(other_subnet.to_string());
                    }
                }
            }
        }

        Ok(reachable)
    }
}

#[async_trait]
impl ReachabilityService for ReachabilityEngine {
    async fn is_subnet_reachable_within_vpc(
        &self,
        vpc: &str,
        subnet1: &str,
        subnet2: &str,
    ) -> FabricResult<bool> {
        self.vpc(vpc).await?.is_subnet_reachable_within(subnet1, subnet2)
    }

    async fn is_subnet_reachable_between_vpcs(
        &self,
        vpc1: &str,
        subnet1: &str,
        vpc2: &str,
        subnet2: &str,
    ) -> FabricResult<bool> {
        if vpc1 == vpc2 {
            return Err(FabricError::structural(format!(
                "between-VPC reachability needs two different VPCs, got {vpc1} twice"
            )));
        }

        let (first, second) = futures::try_join!(self.vpc(vpc1), self.vpc(vpc2))?;
        self.between(&first, subnet1, &second, subnet2).await
    }

    async fn is_subnet_reachable(&self, source: &str, destination: &str) -> FabricResult<bool> {
        let source: SubnetKey = source.parse()?;
        let destination: SubnetKey = destination.parse()?;
        self.subnet_keys_reachable(&source, &destination).await
    }

    async fn is_server_reachable(&self, source: &str, destination: &str) -> FabricResult<bool> {
        let (sources, destinations) = futures::try_join!(
            self.attachments.get_attached_subnets(source),
            self.attachments.get_attached_subnets(destination)
        )?;

        for source_key in sources.keys() {
            let source_key: SubnetKey = source_key.parse()?;
            for destination_key in destinations.keys() {
                let destination_key: SubnetKey = destination_key.parse()?;
                if self.subnet_keys_reachable(&source_key, &destination_key).await? {
                    debug!(
                        "Server {} reaches server {} via {} -> {}",
                        source, destination, source_key, destination_key
                    );
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn is_external_subnet_reachable(
        &self,
        source: &str,
        destination_prefix: &str,
    ) -> FabricResult<bool> {
        destination_prefix.parse::<Ipv4Net>()?;
        self.is_external_reachable(source, |peering| Ok(peering.has_prefix(destination_prefix)))
            .await
    }

    async fn is_external_ip_reachable(
        &self,
        source: &str,
        destination_ip: &str,
    ) -> FabricResult<bool> {
        let ip: Ipv4Addr = destination_ip.parse()?;
        self.is_external_reachable(source, |peering| peering.covers(ip)).await
    }

    async fn is_static_external_ip_reachable(
        &self,
        source: &str,
        destination_ip: &str,
    ) -> FabricResult<bool> {
        let ip: Ipv4Addr = destination_ip.parse()?;

        for key in self.source_subnets(source).await? {
            for conn in self.static_externals(&key.vpc).await? {
                let Some(static_external) = conn.static_external_within(&key.vpc) else {
                    continue;
                };
                for subnet in &static_external.link.subnets {
                    if subnet.parse::<Ipv4Net>()?.contains(&ip) {
                        trace!("{} reaches {} via static external {}", key, ip, conn.meta.name);
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }

    async fn get_reachable_from(
        &self,
        vpc: &str,
    ) -> FabricResult<BTreeMap<String, SubnetReachability>> {
        let vpc = self.vpc(vpc).await?;
        let name = vpc.meta.name.as_str();

        let external_peerings: Vec<ExternalPeering> = store::list(
            self.reader.as_ref(),
            self.namespace(),
            &LabelSelector::related(Relation::Vpc, name),
        )
        .await?;
        let external_peerings: Vec<ExternalPeering> = external_peerings
            .into_iter()
            .filter(|peering| peering.vpc() == name)
            .collect();

        let externals: BTreeSet<&str> = external_peerings
            .iter()
            .map(ExternalPeering::external)
            .collect();
        let live = try_join_all(
            externals
                .iter()
                .map(|external| self.has_external_attachment(external)),
        )
        .await?;
        let attached: BTreeSet<&str> = externals
            .iter()
            .zip(live)
            .filter_map(|(external, live)| live.then_some(*external))
            .collect();

        let (mut peered, static_externals) =
            futures::try_join!(self.peered_subnets(&vpc), self.static_externals(name))?;
        let static_externals: BTreeMap<String, Vec<String>> = static_externals
            .iter()
            .filter_map(|conn| {
                conn.static_external_within(name)
                    .map(|se| (conn.meta.name.clone(), se.link.subnets.clone()))
            })
            .collect();

        let mut result = BTreeMap::new();
        for subnet in vpc.subnet_names() {
            let mut reachability = SubnetReachability {
                within_same_subnet: !vpc.is_subnet_restricted(subnet)?,
                other_vpc_subnets: peered.remove(subnet).unwrap_or_default(),
                static_externals: static_externals.clone(),
                ..Default::default()
            };

            for other in vpc.subnet_names().filter(|other| *other != subnet) {
                if vpc.is_subnet_reachable_within(subnet, other)? {
                    reachability.same_vpc_subnets.insert(other.to_string());
                }
            }

            for peering in &external_peerings {
                if !peering.allows_subnet(subnet) || !attached.contains(peering.external()) {
                    continue;
                }
                reachability
                    .external_prefixes
                    .entry(peering.external().to_string())
                    .or_default()
                    .extend(peering.prefixes().iter().cloned());
            }
            for prefixes in reachability.external_prefixes.values_mut() {
                prefixes.sort();
                prefixes.dedup();
            }

            result.insert(subnet.to_string(), reachability);
        }

        debug!("Computed reachability for {} subnet(s) of VPC {}", result.len(), name);
        Ok(result)
    }
}
