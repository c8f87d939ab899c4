//! Property-based tests for wolfdeploy using proptest.
//!
//! These tests check the merge and normalization invariants over generated
//! topologies and autoscaling bounds.

use proptest::prelude::*;
use wolfdeploy::deployment::{
    deployments_equal, merge_topology, normalize_instance_size, AutoscalingPolicy,
    ComputeAutoscaling, DeploymentSpec, DiskAutoscaling, InstanceSize, NodeSpec, RegionConfig,
    ReplicationUnit,
};
use wolfdeploy::Error;

const TIERS: [u32; 10] = [10, 20, 30, 40, 50, 60, 80, 140, 200, 300];

/// Generator for valid instance size names.
fn any_size() -> impl Strategy<Value = String> {
    (
        prop::sample::select(TIERS.to_vec()),
        prop_oneof![Just("M"), Just("R")],
        prop_oneof![Just(""), Just("_NVME"), Just("_LOW_CPU")],
    )
        .prop_map(|(tier, family, modifier)| format!("{}{}{}", family, tier, modifier))
}

/// Generator for enabled compute policies with a valid bound.
fn any_compute_policy() -> impl Strategy<Value = AutoscalingPolicy> {
    (any_size(), any_size(), any::<bool>()).prop_map(|(a, b, disk)| {
        let (min, max) = if InstanceSize::parse(&a).unwrap() <= InstanceSize::parse(&b).unwrap() {
            (a, b)
        } else {
            (b, a)
        };
        AutoscalingPolicy {
            disk: Some(DiskAutoscaling { enabled: Some(disk) }),
            compute: Some(ComputeAutoscaling {
                enabled: Some(true),
                scale_down_enabled: None,
                min_instance_size: min,
                max_instance_size: max,
            }),
        }
    })
}

fn region(name: String, size: String, provider: &str, backing: String, policy: Option<AutoscalingPolicy>) -> RegionConfig {
    RegionConfig {
        region_name: name,
        provider_name: provider.to_string(),
        backing_provider_name: backing,
        electable: Some(NodeSpec {
            instance_size: size,
            node_count: Some(3),
            ..Default::default()
        }),
        auto_scaling: policy,
        ..Default::default()
    }
}

/// Generator for a region config pair (desired, observed) that only differs
/// in fields the merge reconciles.
fn any_region_pair() -> impl Strategy<Value = (RegionConfig, RegionConfig)> {
    (
        "[A-Z_]{3,12}",
        any_size(),
        any_size(),
        prop_oneof![Just(String::new()), Just("AWS".to_string()), Just("GCP".to_string())],
        prop::option::of(any_compute_policy()),
        any::<bool>(),
    )
        .prop_map(|(name, size, remote_size, observed_backing, policy, stale_backing)| {
            // The remote autoscaler may have moved an in-bound size anywhere
            // within the bound. An out-of-bound size was clamped to the bound.
            let observed_size = match &policy {
                Some(p) => {
                    let clamped = normalize_instance_size(&size, Some(p)).unwrap();
                    if clamped == size {
                        normalize_instance_size(&remote_size, Some(p)).unwrap()
                    } else {
                        clamped
                    }
                }
                None => size.clone(),
            };
            let provider = if observed_backing.is_empty() { "AWS" } else { "TENANT" };

            // Users either copy the reported backing provider or declare one
            // the remote system does not report
            let desired_backing = if observed_backing.is_empty() && stale_backing {
                "AWS".to_string()
            } else {
                observed_backing.clone()
            };

            let desired = region(name.clone(), size, provider, desired_backing, policy.clone());
            let observed = region(name, observed_size, provider, observed_backing, policy);
            (desired, observed)
        })
}

fn any_deployment_pair() -> impl Strategy<Value = (DeploymentSpec, DeploymentSpec)> {
    (
        prop::collection::vec(prop::collection::vec(any_region_pair(), 1..4), 1..3),
        prop::option::of(10u32..500u32),
    )
        .prop_map(|(units, disk_size_gb)| {
            let mut desired = DeploymentSpec { disk_size_gb, ..Default::default() };
            let mut observed = DeploymentSpec { disk_size_gb, ..Default::default() };

            for (i, regions) in units.into_iter().enumerate() {
                let (d, o): (Vec<_>, Vec<_>) = regions.into_iter().unzip();
                let zone = format!("Zone {}", i + 1);
                desired.replication_specs.push(ReplicationUnit {
                    shard_count: 1,
                    zone_name: zone.clone(),
                    region_configs: d,
                    ..Default::default()
                });
                observed.replication_specs.push(ReplicationUnit {
                    id: Some(format!("spec-{}", i)),
                    shard_count: 1,
                    zone_name: zone,
                    region_configs: o,
                });
            }

            (desired, observed)
        })
}

proptest! {
    /// Test: normalizing twice gives the same result as normalizing once.
    #[test]
    fn test_normalize_is_idempotent(size in any_size(), policy in any_compute_policy()) {
        let once = normalize_instance_size(&size, Some(&policy)).unwrap();
        let twice = normalize_instance_size(&once, Some(&policy)).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Test: the normalized size always lies within [min, max].
    #[test]
    fn test_normalize_stays_within_bounds(size in any_size(), policy in any_compute_policy()) {
        let compute = policy.compute.as_ref().unwrap();
        let result = InstanceSize::parse(&normalize_instance_size(&size, Some(&policy)).unwrap()).unwrap();
        prop_assert!(result >= InstanceSize::parse(&compute.min_instance_size).unwrap());
        prop_assert!(result <= InstanceSize::parse(&compute.max_instance_size).unwrap());
    }

    /// Test: the backing provider survives the merge exactly when the remote
    /// system reports one.
    #[test]
    fn test_backing_provider_follows_observed(pair in any_deployment_pair()) {
        let (desired, observed) = pair;
        let merged = merge_topology(&desired, &observed).unwrap().merged;

        for (u, unit) in merged.replication_specs.iter().enumerate() {
            for (r, region) in unit.region_configs.iter().enumerate() {
                let observed_backing = &observed.replication_specs[u].region_configs[r].backing_provider_name;
                let desired_backing = &desired.replication_specs[u].region_configs[r].backing_provider_name;
                if observed_backing.is_empty() {
                    prop_assert!(region.backing_provider_name.is_empty());
                } else {
                    prop_assert_eq!(&region.backing_provider_name, desired_backing);
                }
            }
        }
    }

    /// Test: a merged spec compares equal to the observed spec when the two
    /// only differ in fields the merge reconciles.
    #[test]
    fn test_merged_matches_observed(pair in any_deployment_pair()) {
        let (desired, observed) = pair;
        let result = merge_topology(&desired, &observed).unwrap();
        prop_assert_eq!(&result.observed, &observed);

        let (equal, paths) = deployments_equal(&result.merged, &result.observed);
        prop_assert!(equal, "unexpected differences: {:?}", paths);
    }

    /// Test: an invalid family letter in the bound fails the whole merge
    /// even after other regions merged cleanly.
    #[test]
    fn test_invalid_bound_fails_merge(
        pair in any_deployment_pair(),
        letter in "[A-LN-QS-Z]",
    ) {
        let (mut desired, observed) = pair;
        // The last region, so earlier regions merge before the failure
        let unit = desired.replication_specs.last_mut().unwrap();
        let region = unit.region_configs.last_mut().unwrap();
        region.auto_scaling = Some(AutoscalingPolicy {
            disk: Some(DiskAutoscaling { enabled: Some(true) }),
            compute: Some(ComputeAutoscaling {
                enabled: Some(true),
                scale_down_enabled: None,
                min_instance_size: format!("{}10", letter),
                max_instance_size: "M40".into(),
            }),
        });

        let err = merge_topology(&desired, &observed).unwrap_err();
        prop_assert!(matches!(err, Error::InvalidInstanceSize(_)));
    }
}
