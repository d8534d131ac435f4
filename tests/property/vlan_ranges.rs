// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for VLAN Range Algebra
//!
//! `normalize` must produce a sorted, non-overlapping set that covers
//! exactly the VLANs of its input, and must be a fixed point of itself.

use cim_fabric::domain::vlan::{check_overlap, normalize, ranges_contain};
use cim_fabric::domain::VlanRange;
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// A valid range; `to == 0` (single VLAN) about one time in five
fn vlan_range() -> impl Strategy<Value = VlanRange> {
    (1u16..=4094, 0u16..300, 0u8..5).prop_map(|(from, span, open)| {
        if open == 0 {
            VlanRange::new(from, 0)
        } else {
            VlanRange::new(from, from.saturating_add(span).min(4094))
        }
    })
}

fn range_set() -> impl Strategy<Value = Vec<VlanRange>> {
    prop::collection::vec(vlan_range(), 0..12)
}

/// VLANs worth probing for a range set: every bound and its neighbours
fn probes(ranges: &[VlanRange]) -> Vec<u16> {
    let mut probes = vec![1, 4094];
    for range in ranges {
        for bound in [range.from, range.to] {
            probes.extend([bound.saturating_sub(1), bound, bound.saturating_add(1)]);
        }
    }
    probes.retain(|vlan| (1..=4094).contains(vlan));
    probes
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: normalize is idempotent
    #[test]
    fn prop_normalize_idempotent(ranges in range_set()) {
        let once = normalize(&ranges).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property: normalized ranges never overlap
    #[test]
    fn prop_normalized_has_no_overlap(ranges in range_set()) {
        let normalized = normalize(&ranges).unwrap();
        prop_assert!(check_overlap(&normalized).is_ok());
    }

    /// Property: normalized ranges are sorted and closed
    #[test]
    fn prop_normalized_sorted_and_closed(ranges in range_set()) {
        let normalized = normalize(&ranges).unwrap();
        for range in &normalized {
            prop_assert!(range.from <= range.to);
            prop_assert!(range.to != 0);
        }
        for pair in normalized.windows(2) {
            prop_assert!(pair[0].to < pair[1].from);
        }
    }

    /// Property: normalize preserves coverage
    ///
    /// A VLAN is covered by the input exactly when it is covered by the
    /// normalized output.
    #[test]
    fn prop_normalize_preserves_coverage(ranges in range_set()) {
        let normalized = normalize(&ranges).unwrap();
        for vlan in probes(&ranges) {
            prop_assert_eq!(
                ranges_contain(&ranges, vlan),
                ranges_contain(&normalized, vlan),
                "coverage differs at VLAN {}",
                vlan
            );
        }
    }

    /// Property: overlap detection agrees with coverage
    ///
    /// `check_overlap` fails exactly when some VLAN is covered twice.
    #[test]
    fn prop_overlap_matches_double_coverage(ranges in range_set()) {
        let filled: Vec<VlanRange> = ranges
            .iter()
            .map(|r| if r.to == 0 { VlanRange::single(r.from) } else { *r })
            .collect();
        let double = probes(&filled).into_iter().any(|vlan| {
            filled.iter().filter(|r| r.contains(vlan)).count() > 1
        });
        prop_assert_eq!(check_overlap(&ranges).is_err(), double);
    }
}
