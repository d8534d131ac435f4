// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric control-plane core for the Composable Information Machine
//!
//! Models the physical and logical links of a spine-leaf data-center fabric
//! and answers reachability questions over its VPC policy objects.
//!
//! # Modules
//!
//! - [`domain`] - port names, VLAN range algebra and per-object invariants
//! - [`wiring`] - servers, switches and the nine connection topologies
//! - [`vpc`] - VPCs, attachments, peerings and externals
//! - [`objects`] / [`labels`] - the object envelope and the derived label index
//! - [`store`] - the read boundary and its in-memory implementation
//! - [`nats`] / [`subjects`] - the NATS-backed read boundary
//! - [`service`] - attachment index, reachability engine and validation

pub mod config;
pub mod domain;
pub mod errors;
pub mod labels;
pub mod nats;
pub mod objects;
pub mod service;
pub mod store;
pub mod subjects;
pub mod vpc;
pub mod wiring;

// Re-export commonly used types
pub use config::FabricConfig;
pub use errors::{FabricError, FabricResult};
pub use labels::{LabelSelector, Relation};
pub use nats::{NatsConfig, NatsObjectReader, ObjectReadResponder};
pub use objects::{FabricObject, Kind, Object, ObjectMeta};
pub use service::{
    Attachment, AttachmentIndex, ReachabilityEngine, ReachabilityService, SubnetReachability,
    ValidationService,
};
pub use store::{MemoryStore, ObjectReader};
