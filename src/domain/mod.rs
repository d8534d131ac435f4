// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fabric Domain Models
//!
//! Value objects every fabric object is built from, and the pure
//! validation functions that check single objects.
//!
//! # Value Objects with Invariants
//!
//! - [`PortName`] - `device/port` identifiers
//! - [`VlanId`] - IEEE 802.1Q VLAN ID (1-4094)
//! - [`VlanRange`] - VLAN intervals and their normalization
//!
//! # Invariants
//!
//! - [`invariants`] - pure per-object validation

pub mod invariants;
pub mod port;
pub mod vlan;

pub use invariants::{ValidationError, ValidationResult};
pub use port::{PortError, PortName, PORT_SEPARATOR};
pub use vlan::{VlanError, VlanId, VlanRange};
