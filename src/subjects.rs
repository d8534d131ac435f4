// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for the object read API
//!
//! The NATS-backed [`ObjectReader`](crate::store::ObjectReader) talks to an
//! external store service over request/reply on these subjects.
//!
//! # Subject Pattern
//!
//! ```text
//! {root}.objects.{kind}.{operation}
//! ```
//!
//! This allows for:
//! - Precise requests (`fabric.objects.vpc.get`)
//! - Operation-level wildcards for responders (`fabric.objects.*.list`)
//! - Global subscriptions (`fabric.objects.>`)
//!
//! # Examples
//!
//! ```rust
//! use cim_fabric::objects::Kind;
//! use cim_fabric::subjects::{ObjectSubjects, ReadOperation};
//!
//! let subjects = ObjectSubjects::default();
//! assert_eq!(subjects.subject(Kind::VpcPeering, ReadOperation::List), "fabric.objects.vpc-peering.list");
//! assert_eq!(subjects.wildcard(ReadOperation::Get), "fabric.objects.*.get");
//! assert_eq!(
//!     subjects.parse("fabric.objects.vpc.get"),
//!     Some((Kind::Vpc, ReadOperation::Get))
//! );
//! ```

use std::fmt;

use crate::objects::Kind;

/// Default root for all fabric subjects
pub const FABRIC_ROOT: &str = "fabric";

/// Segment under the root that scopes the object read API
pub const OBJECTS_SEGMENT: &str = "objects";

/// Read operations exposed by the store service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadOperation {
    /// Fetch one object by name
    Get,
    /// List objects matching a label selector
    List,
}

impl ReadOperation {
    pub const ALL: [ReadOperation; 2] = [ReadOperation::Get, ReadOperation::List];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadOperation::Get => "get",
            ReadOperation::List => "list",
        }
    }
}

impl fmt::Display for ReadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder and parser for object read subjects under one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSubjects {
    root: String,
}

impl ObjectSubjects {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `{root}.objects.{kind}.{operation}`
    pub fn subject(&self, kind: Kind, operation: ReadOperation) -> String {
        format!("{}.{}.{}.{}", self.root, OBJECTS_SEGMENT, kind, operation)
    }

    /// `{root}.objects.*.{operation}`
    pub fn wildcard(&self, operation: ReadOperation) -> String {
        format!("{}.{}.*.{}", self.root, OBJECTS_SEGMENT, operation)
    }

    /// `{root}.objects.>`
    pub fn all(&self) -> String {
        format!("{}.{}.>", self.root, OBJECTS_SEGMENT)
    }

    /// Recover kind and operation from a request subject
    pub fn parse(&self, subject: &str) -> Option<(Kind, ReadOperation)> {
        let rest = subject
            .strip_prefix(self.root.as_str())?
            .strip_prefix('.')?
            .strip_prefix(OBJECTS_SEGMENT)?
            .strip_prefix('.')?;
        let (kind, operation) = rest.split_once('.')?;

        let kind = Kind::ALL.into_iter().find(|k| k.as_str() == kind)?;
        let operation = ReadOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == operation)?;
        Some((kind, operation))
    }
}

impl Default for ObjectSubjects {
    fn default() -> Self {
        Self::new(FABRIC_ROOT)
    }
}
