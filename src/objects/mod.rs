// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric API Objects
//!
//! Every object read from the store is `{ meta, spec }`. [`Object`] is the
//! closed sum over all kinds that crosses the read interface; typed access
//! goes through [`FabricObject`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::DEFAULT_NAMESPACE;
use crate::errors::{FabricError, FabricResult};
use crate::labels::Labels;
use crate::vpc::{
    External, ExternalAttachment, ExternalPeering, Ipv4Namespace, Vpc, VpcAttachment, VpcPeering,
};
use crate::wiring::{Connection, Server, Switch, SwitchGroup, VlanNamespace};

/// Object kinds known to the fabric core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    Server,
    Switch,
    SwitchGroup,
    Connection,
    VlanNamespace,
    Ipv4Namespace,
    Vpc,
    VpcAttachment,
    VpcPeering,
    External,
    ExternalAttachment,
    ExternalPeering,
}

impl Kind {
    pub const ALL: [Kind; 12] = [
        Kind::Server,
        Kind::Switch,
        Kind::SwitchGroup,
        Kind::Connection,
        Kind::VlanNamespace,
        Kind::Ipv4Namespace,
        Kind::Vpc,
        Kind::VpcAttachment,
        Kind::VpcPeering,
        Kind::External,
        Kind::ExternalAttachment,
        Kind::ExternalPeering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Server => "server",
            Kind::Switch => "switch",
            Kind::SwitchGroup => "switch-group",
            Kind::Connection => "connection",
            Kind::VlanNamespace => "vlan-namespace",
            Kind::Ipv4Namespace => "ipv4-namespace",
            Kind::Vpc => "vpc",
            Kind::VpcAttachment => "vpc-attachment",
            Kind::VpcPeering => "vpc-peering",
            Kind::External => "external",
            Kind::ExternalAttachment => "external-attachment",
            Kind::ExternalPeering => "external-peering",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Object metadata
///
/// `uid` and `creation_timestamp` are assigned by the store on first write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

impl ObjectMeta {
    /// Metadata in the default namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Typed access to a fabric object
pub trait FabricObject: Clone + Send + Sync + Sized + 'static {
    const KIND: Kind;

    fn meta(&self) -> &ObjectMeta;

    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// Labels derived from the spec; see [`crate::labels`] for the protocol
    fn derive_labels(&self) -> Labels;

    fn into_object(self) -> Object;

    fn from_object(object: Object) -> FabricResult<Self>;

    fn name(&self) -> &str {
        &self.meta().name
    }
}

/// Any fabric object, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Object {
    Server(Server),
    Switch(Switch),
    SwitchGroup(SwitchGroup),
    Connection(Connection),
    VlanNamespace(VlanNamespace),
    Ipv4Namespace(Ipv4Namespace),
    Vpc(Vpc),
    VpcAttachment(VpcAttachment),
    VpcPeering(VpcPeering),
    External(External),
    ExternalAttachment(ExternalAttachment),
    ExternalPeering(ExternalPeering),
}

macro_rules! dispatch {
    ($object:expr, $inner:ident => $body:expr) => {
        match $object {
            Object::Server($inner) => $body,
            Object::Switch($inner) => $body,
            Object::SwitchGroup($inner) => $body,
            Object::Connection($inner) => $body,
            Object::VlanNamespace($inner) => $body,
            Object::Ipv4Namespace($inner) => $body,
            Object::Vpc($inner) => $body,
            Object::VpcAttachment($inner) => $body,
            Object::VpcPeering($inner) => $body,
            Object::External($inner) => $body,
            Object::ExternalAttachment($inner) => $body,
            Object::ExternalPeering($inner) => $body,
        }
    };
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::Server(_) => Kind::Server,
            Object::Switch(_) => Kind::Switch,
            Object::SwitchGroup(_) => Kind::SwitchGroup,
            Object::Connection(_) => Kind::Connection,
            Object::VlanNamespace(_) => Kind::VlanNamespace,
            Object::Ipv4Namespace(_) => Kind::Ipv4Namespace,
            Object::Vpc(_) => Kind::Vpc,
            Object::VpcAttachment(_) => Kind::VpcAttachment,
            Object::VpcPeering(_) => Kind::VpcPeering,
            Object::External(_) => Kind::External,
            Object::ExternalAttachment(_) => Kind::ExternalAttachment,
            Object::ExternalPeering(_) => Kind::ExternalPeering,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        dispatch!(self, inner => inner.meta())
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        dispatch!(self, inner => inner.meta_mut())
    }

    pub fn derive_labels(&self) -> Labels {
        dispatch!(self, inner => inner.derive_labels())
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Downcast into a typed object
    pub fn into_typed<T: FabricObject>(self) -> FabricResult<T> {
        T::from_object(self)
    }
}

/// Implements the typed accessors; `derive_labels` comes from an inherent
/// `labels()` method on each object.
macro_rules! fabric_object {
    ($($kind:ident),+ $(,)?) => {
        $(
            impl FabricObject for $kind {
                const KIND: Kind = Kind::$kind;

                fn meta(&self) -> &ObjectMeta {
                    &self.meta
                }

                fn meta_mut(&mut self) -> &mut ObjectMeta {
                    &mut self.meta
                }

                fn derive_labels(&self) -> Labels {
                    self.labels()
                }

                fn into_object(self) -> Object {
                    Object::$kind(self)
                }

                fn from_object(object: Object) -> FabricResult<Self> {
                    match object {
                        Object::$kind(inner) => Ok(inner),
                        other => Err(FabricError::structural(format!(
                            "expected {} object, got {} {}",
                            Kind::$kind,
                            other.kind(),
                            other.name()
                        ))),
                    }
                }
            }

            impl From<$kind> for Object {
                fn from(value: $kind) -> Self {
                    Object::$kind(value)
                }
            }
        )+
    };
}

fabric_object!(
    Server,
    Switch,
    SwitchGroup,
    Connection,
    VlanNamespace,
    Ipv4Namespace,
    Vpc,
    VpcAttachment,
    VpcPeering,
    External,
    ExternalAttachment,
    ExternalPeering,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vpc::{Subnet, VpcSpec};

    #[test]
    fn test_object_is_tagged_by_kind() {
        let vpc = Vpc::new(
            "vpc-1",
            VpcSpec::default().with_subnet("subnet-1", Subnet::new("10.0.1.0/24", 1001)),
        );
        let json = serde_json::to_value(Object::from(vpc.clone())).unwrap();
        assert_eq!(json["kind"], "vpc");
        assert_eq!(json["meta"]["name"], "vpc-1");

        let decoded: Object = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.kind(), Kind::Vpc);
        assert_eq!(decoded.into_typed::<Vpc>().unwrap(), vpc);
    }

    #[test]
    fn test_downcast_to_wrong_kind_is_structural() {
        let object = Object::from(Server::new("server-1"));
        let err = object.into_typed::<Switch>().unwrap_err();
        assert!(err.is_structural());
    }
}
