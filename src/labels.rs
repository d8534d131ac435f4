// Copyright (c) 2025 - Cowboy AI, Inc.

//! Derived label keys and selectors
//!
//! Every object carries labels derived from its spec. Stores index objects
//! by these labels so relationship queries ("connections touching server
//! X", "peerings involving VPC Z") never scan a whole kind.
//!
//! # Label Pattern
//!
//! ```text
//! {relation}.{object name} = true
//! connection-type          = {connection type}
//! ```
//!
//! # Index Protocol
//!
//! 1. A store MUST call [`FabricObject::derive_labels`](crate::objects::FabricObject::derive_labels)
//!    whenever an object is created or replaced, and refresh its index.
//! 2. Managed keys ([`is_managed`]) are owned by the derivation; stale
//!    managed keys are dropped, user labels are kept.
//! 3. All list-by-relationship queries go through a [`LabelSelector`].
//!
//! # Examples
//!
//! ```rust
//! use cim_fabric::labels::{LabelKey, LabelSelector, Relation};
//!
//! let key = LabelKey::new(Relation::Server, "server-1");
//! assert_eq!(key.to_string(), "server.server-1");
//!
//! let selector = LabelSelector::new()
//!     .with_relation(Relation::Vpc, "vpc-1")
//!     .with_relation(Relation::Vpc, "vpc-2");
//! assert_eq!(selector.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label value marking a relationship
pub const LABEL_TRUE: &str = "true";

/// Label key holding the connection type
pub const CONNECTION_TYPE_LABEL: &str = "connection-type";

/// Object labels
pub type Labels = BTreeMap<String, String>;

/// Relationship a derived label encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Object touches a server
    Server,
    /// Object touches a switch
    Switch,
    /// Object involves or is scoped to a VPC
    Vpc,
    /// Object refers to an external
    External,
    /// Object refers to a connection
    Connection,
    /// Switch is a member of a switch group
    Group,
    /// Switch belongs to a redundancy group
    Redundancy,
}

impl Relation {
    pub const ALL: [Relation; 7] = [
        Relation::Server,
        Relation::Switch,
        Relation::Vpc,
        Relation::External,
        Relation::Connection,
        Relation::Group,
        Relation::Redundancy,
    ];

    fn prefix(&self) -> &'static str {
        match self {
            Relation::Server => "server",
            Relation::Switch => "switch",
            Relation::Vpc => "vpc",
            Relation::External => "external",
            Relation::Connection => "connection",
            Relation::Group => "group",
            Relation::Redundancy => "redundancy",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Derived relationship label key, `{relation}.{name}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelKey {
    relation: Relation,
    name: String,
}

impl LabelKey {
    pub fn new(relation: Relation, name: impl Into<String>) -> Self {
        Self {
            relation,
            name: name.into(),
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.relation, self.name)
    }
}

/// Whether a label key is owned by label derivation
pub fn is_managed(key: &str) -> bool {
    key == CONNECTION_TYPE_LABEL
        || Relation::ALL.iter().any(|relation| {
            key.strip_prefix(relation.prefix())
                .is_some_and(|rest| rest.starts_with('.'))
        })
}

/// Builder for derived label sets
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Labels,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `{relation}.{name}=true` label
    pub fn relation(mut self, relation: Relation, name: impl Into<String>) -> Self {
        self.labels
            .insert(LabelKey::new(relation, name).to_string(), LABEL_TRUE.to_string());
        self
    }

    /// Add one relation label per name
    pub fn relations<I, S>(mut self, relation: Relation, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self = self.relation(relation, name);
        }
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Labels {
        self.labels
    }
}

/// Conjunction of exact label matches
///
/// The empty selector matches every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSelector {
    terms: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector for a single relationship label
    pub fn related(relation: Relation, name: impl Into<String>) -> Self {
        Self::new().with_relation(relation, name)
    }

    pub fn with_relation(self, relation: Relation, name: impl Into<String>) -> Self {
        self.with(LabelKey::new(relation, name).to_string(), LABEL_TRUE)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.terms.insert(key.into(), value.into());
        self
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether `labels` satisfies every term
    pub fn matches(&self, labels: &Labels) -> bool {
        self.terms
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value))
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", terms.join(","))
    }
}
