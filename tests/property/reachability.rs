// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Within-VPC Reachability
//!
//! For any VPC shape (per-subnet overrides, defaults, permit groups):
//! reachability between two different subnets is symmetric, a subnet reaches
//! itself exactly when it is not restricted, and the store-backed engine
//! agrees with the rule evaluated on the VPC object alone.

use std::sync::Arc;

use cim_fabric::config::FabricConfig;
use cim_fabric::service::{ReachabilityEngine, ReachabilityService};
use cim_fabric::store::MemoryStore;
use cim_fabric::vpc::{Subnet, Vpc, VpcSpec};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn subnet_name(index: usize) -> String {
    format!("subnet-{}", index + 1)
}

fn subnet() -> impl Strategy<Value = (Option<bool>, Option<bool>)> {
    (
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
    )
}

/// A VPC with 2-6 subnets and up to three permit groups
fn vpc() -> impl Strategy<Value = Vpc> {
    (2usize..=6)
        .prop_flat_map(|count| {
            (
                prop::collection::vec(subnet(), count),
                any::<bool>(),
                any::<bool>(),
                prop::collection::vec(prop::sample::subsequence((0..count).collect::<Vec<_>>(), 2..=count), 0..=3),
            )
        })
        .prop_map(|(subnets, default_isolated, default_restricted, permits)| {
            let mut spec = VpcSpec::default()
                .with_default_isolated(default_isolated)
                .with_default_restricted(default_restricted);
            for (index, (isolated, restricted)) in subnets.into_iter().enumerate() {
                let mut subnet = Subnet::new(format!("10.0.{index}.0/24"), 1000 + index as u16);
                subnet.isolated = isolated;
                subnet.restricted = restricted;
                spec = spec.with_subnet(subnet_name(index), subnet);
            }
            for group in permits {
                spec = spec.with_permit(group.into_iter().map(subnet_name));
            }
            Vpc::new("vpc-1", spec)
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: within-VPC reachability between different subnets is symmetric
    #[test]
    fn prop_within_vpc_symmetric(vpc in vpc()) {
        let names: Vec<String> = vpc.subnet_names().map(str::to_string).collect();
        for a in &names {
            for b in names.iter().filter(|b| *b != a) {
                prop_assert_eq!(
                    vpc.is_subnet_reachable_within(a, b).unwrap(),
                    vpc.is_subnet_reachable_within(b, a).unwrap(),
                    "{} <-> {}",
                    a,
                    b
                );
            }
        }
    }

    /// Property: a subnet reaches itself exactly when it is not restricted
    #[test]
    fn prop_self_reachability_is_restriction(vpc in vpc()) {
        for name in vpc.subnet_names() {
            prop_assert_eq!(
                vpc.is_subnet_reachable_within(name, name).unwrap(),
                !vpc.is_subnet_restricted(name).unwrap()
            );
        }
    }

    /// Property: open subnets always reach each other; permit groups open the rest
    #[test]
    fn prop_isolation_and_permits(vpc in vpc()) {
        let names: Vec<&str> = vpc.subnet_names().collect();
        for a in &names {
            for b in names.iter().filter(|b| *b != a) {
                let open = !vpc.is_subnet_isolated(a).unwrap() && !vpc.is_subnet_isolated(b).unwrap();
                prop_assert_eq!(
                    vpc.is_subnet_reachable_within(a, b).unwrap(),
                    open || vpc.permits(a, b)
                );
            }
        }
    }

    /// Property: the engine agrees with the VPC object
    #[test]
    fn prop_engine_matches_object(vpc in vpc()) {
        let store = Arc::new(MemoryStore::new());
        let engine = ReachabilityEngine::new(store.clone(), FabricConfig::default());

        tokio_test::block_on(async {
            store.apply(vpc.clone()).await.unwrap();
            for a in vpc.subnet_names() {
                for b in vpc.subnet_names() {
                    let stored = engine
                        .is_subnet_reachable_within_vpc("vpc-1", a, b)
                        .await
                        .unwrap();
                    assert_eq!(stored, vpc.is_subnet_reachable_within(a, b).unwrap(), "{a} -> {b}");
                }
            }
        });
    }
}
