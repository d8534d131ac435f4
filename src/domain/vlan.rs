// Copyright (c) 2025 - Cowboy AI, Inc.
//! VLAN Value Objects and Range Algebra
//!
//! VLAN namespaces partition the 802.1Q id space into inclusive ranges. The
//! functions here normalize range sets (fill open upper bounds, sort, merge)
//! and detect overlap between ranges.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::errors::FabricError;

/// VLAN validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VlanError {
    #[error("Invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("Invalid VLAN range {from}..{to}: lower bound is above upper bound")]
    InvertedRange { from: u16, to: u16 },

    #[error("VLAN range {0} overlaps with {1}")]
    Overlap(VlanRange, VlanRange),
}

impl From<VlanError> for FabricError {
    fn from(err: VlanError) -> Self {
        match err {
            VlanError::Overlap(..) => FabricError::relationship(err.to_string()),
            _ => FabricError::structural_with_cause("invalid VLAN", err),
        }
    }
}

/// VLAN ID value object
///
/// Invariants:
/// - Valid VLAN ID range (1-4094)
/// - VLAN 0 and 4095 are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Minimum valid VLAN ID
    pub const MIN: u16 = 1;

    /// Maximum valid VLAN ID
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, VlanError> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(VlanError::InvalidVlanId(id));
        }

        Ok(Self(id))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = VlanError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

/// Inclusive VLAN range
///
/// `to == 0` means a single-VLAN range; [`normalize`] rewrites it to
/// `to == from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VlanRange {
    pub from: u16,
    #[serde(default)]
    pub to: u16,
}

impl VlanRange {
    pub const fn new(from: u16, to: u16) -> Self {
        Self { from, to }
    }

    /// Single-VLAN range
    pub const fn single(vlan: u16) -> Self {
        Self { from: vlan, to: vlan }
    }

    /// Whether `vlan` falls inside this (normalized) range
    pub fn contains(&self, vlan: u16) -> bool {
        self.from <= vlan && vlan <= self.to
    }

    fn filled(self) -> Self {
        if self.to == 0 {
            Self::single(self.from)
        } else {
            self
        }
    }
}

impl fmt::Display for VlanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to || self.to == 0 {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// Normalize a range set: fill open upper bounds, validate, sort and merge
///
/// Overlapping and touching-by-overlap ranges are merged; ranges that are
/// merely adjacent (`100-199`, `200-300`) stay separate. The result is
/// idempotent under a second normalization.
pub fn normalize(ranges: &[VlanRange]) -> Result<Vec<VlanRange>, VlanError> {
    let mut sorted = Vec::with_capacity(ranges.len());
    for range in ranges {
        let range = range.filled();
        VlanId::new(range.from)?;
        VlanId::new(range.to)?;
        if range.from > range.to {
            return Err(VlanError::InvertedRange {
                from: range.from,
                to: range.to,
            });
        }
        sorted.push(range);
    }
    sorted.sort();

    let mut merged: Vec<VlanRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            Some(last) if last.to >= range.from => {
                last.to = last.to.max(range.to);
            }
            _ => merged.push(range),
        }
    }

    Ok(merged)
}

/// Report the first pair of overlapping ranges, if any
pub fn check_overlap(ranges: &[VlanRange]) -> Result<(), VlanError> {
    let mut sorted: Vec<VlanRange> = ranges.iter().map(|r| r.filled()).collect();
    sorted.sort();

    for pair in sorted.windows(2) {
        if pair[0].to >= pair[1].from {
            return Err(VlanError::Overlap(pair[0], pair[1]));
        }
    }

    Ok(())
}

/// Whether `vlan` is covered by any range of a normalized set
pub fn ranges_contain(ranges: &[VlanRange], vlan: u16) -> bool {
    ranges.iter().any(|r| r.filled().contains(vlan))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlan_id() {
        assert!(VlanId::new(100).is_ok());
        assert!(VlanId::new(0).is_err()); // Reserved
        assert!(VlanId::new(4095).is_err()); // Reserved
        assert!(VlanId::new(5000).is_err());
    }

    #[test]
    fn test_normalize_merges_overlapping() {
        let ranges = [
            VlanRange::new(200, 300),
            VlanRange::new(200, 200),
            VlanRange::new(150, 300),
            VlanRange::new(150, 150),
            VlanRange::new(500, 500),
            VlanRange::new(500, 600),
            VlanRange::new(700, 700),
            VlanRange::new(100, 250),
            VlanRange::new(100, 100),
        ];

        let normalized = normalize(&ranges).unwrap();
        assert_eq!(
            normalized,
            vec![
                VlanRange::new(100, 300),
                VlanRange::new(500, 600),
                VlanRange::new(700, 700),
            ]
        );
    }

    #[test]
    fn test_normalize_fills_open_upper_bound() {
        let normalized = normalize(&[VlanRange::new(42, 0)]).unwrap();
        assert_eq!(normalized, vec![VlanRange::single(42)]);
    }

    #[test]
    fn test_normalize_keeps_adjacent_ranges_apart() {
        let normalized = normalize(&[VlanRange::new(200, 300), VlanRange::new(100, 199)]).unwrap();
        assert_eq!(
            normalized,
            vec![VlanRange::new(100, 199), VlanRange::new(200, 300)]
        );
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert_eq!(
            normalize(&[VlanRange::new(300, 200)]),
            Err(VlanError::InvertedRange { from: 300, to: 200 })
        );
        assert_eq!(
            normalize(&[VlanRange::new(0, 10)]),
            Err(VlanError::InvalidVlanId(0))
        );
        assert_eq!(
            normalize(&[VlanRange::new(4000, 4095)]),
            Err(VlanError::InvalidVlanId(4095))
        );
    }

    #[test]
    fn test_check_overlap() {
        assert!(check_overlap(&[VlanRange::new(100, 199), VlanRange::new(200, 300)]).is_ok());
        assert_eq!(
            check_overlap(&[VlanRange::new(250, 300), VlanRange::new(100, 250)]),
            Err(VlanError::Overlap(
                VlanRange::new(100, 250),
                VlanRange::new(250, 300)
            ))
        );
        assert!(check_overlap(&[VlanRange::single(10), VlanRange::new(10, 0)]).is_err());
    }

    #[test]
    fn test_ranges_contain() {
        let ranges = [VlanRange::new(1000, 1999), VlanRange::single(3000)];
        assert!(ranges_contain(&ranges, 1000));
        assert!(ranges_contain(&ranges, 1999));
        assert!(ranges_contain(&ranges, 3000));
        assert!(!ranges_contain(&ranges, 2000));
    }
}
