// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Fabric Queries
//!
//! Store-backed operations over the desired-state graph. Services hold an
//! `Arc<dyn ObjectReader>` and a [`FabricConfig`](crate::config::FabricConfig)
//! and keep no other state, so one instance can be shared by any number of
//! concurrent callers.
//!
//! # Architecture
//!
//! ```text
//! Caller (controller, webhook, CLI)
//!     ↓
//! ReachabilityEngine ──→ AttachmentIndex
//!     ↓                        ↓
//! ObjectReader (get / list by label)
//!     ↓
//! MemoryStore | NatsObjectReader
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_fabric::config::FabricConfig;
//! use cim_fabric::service::{ReachabilityEngine, ReachabilityService};
//! use cim_fabric::store::MemoryStore;
//!
//! # async fn example() -> cim_fabric::FabricResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = ReachabilityEngine::new(store, FabricConfig::default());
//!
//! let reachable = engine
//!     .is_subnet_reachable_within_vpc("vpc-1", "subnet-1", "subnet-2")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod attachment;
pub mod reachability;
pub mod validation;

pub use attachment::{Attachment, AttachmentIndex};
pub use reachability::{ReachabilityEngine, ReachabilityService, Source, SubnetReachability};
pub use validation::{check_port_uniqueness, check_redundancy, ValidationService};
