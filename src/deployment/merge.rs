//! Desired/Observed Merge
//!
//! Produces the spec that is submitted to the remote API: the desired spec
//! with every field the remote system is authoritative for cleared, so a
//! write never fights the remote system over values it assigns itself.
//!
//! Replication specs and region configs are paired by position. Both sides
//! must have the same shape; adding or removing shards and regions is not
//! handled here.

use super::autoscaling::normalize_instance_size;
use super::{DeploymentSpec, NodeSlot, RegionConfig};
use crate::error::{Error, Result};

/// Result of merging a desired spec with the observed one
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDeployment {
    /// Desired spec with remote-authoritative fields cleared
    pub merged: DeploymentSpec,
    /// Observed spec, as reported
    pub observed: DeploymentSpec,
}

/// Merge `desired` with `observed`.
///
/// `desired` is never modified; on error nothing is returned, so a partially
/// merged spec cannot be submitted by accident.
pub fn merge_topology(desired: &DeploymentSpec, observed: &DeploymentSpec) -> Result<MergedDeployment> {
    check_shape(desired, observed)?;

    let mut merged = desired.clone();
    let mut disk_autoscaled = false;

    for (unit, observed_unit) in merged
        .replication_specs
        .iter_mut()
        .zip(&observed.replication_specs)
    {
        for (region, observed_region) in unit
            .region_configs
            .iter_mut()
            .zip(&observed_unit.region_configs)
        {
            merge_backing_provider(region, observed_region);

            if merge_autoscaled_sizes(region)? {
                disk_autoscaled = true;
            }
        }
    }

    if disk_autoscaled {
        merged.disk_size_gb = None;
    }

    Ok(MergedDeployment {
        merged,
        observed: observed.clone(),
    })
}

/// Both topologies must pair up index by index
fn check_shape(desired: &DeploymentSpec, observed: &DeploymentSpec) -> Result<()> {
    if desired.replication_specs.len() != observed.replication_specs.len() {
        return Err(Error::TopologyMismatch {
            path: "replicationSpecs".into(),
            desired: desired.replication_specs.len(),
            observed: observed.replication_specs.len(),
        });
    }

    for (i, (unit, observed_unit)) in desired
        .replication_specs
        .iter()
        .zip(&observed.replication_specs)
        .enumerate()
    {
        if unit.region_configs.len() != observed_unit.region_configs.len() {
            return Err(Error::TopologyMismatch {
                path: format!("replicationSpecs[{}].regionConfigs", i),
                desired: unit.region_configs.len(),
                observed: observed_unit.region_configs.len(),
            });
        }
    }

    Ok(())
}

/// The remote system only reports a backing provider for tenant-style
/// providers. When it reports none, none must be submitted.
fn merge_backing_provider(region: &mut RegionConfig, observed: &RegionConfig) {
    if observed.backing_provider_name.is_empty() && !region.backing_provider_name.is_empty() {
        tracing::debug!(
            region = %region.region_name,
            "Dropping backing provider {} not reported by the remote system",
            region.backing_provider_name
        );
        region.backing_provider_name.clear();
    }
}

/// Apply the region's autoscaling policy to its node specs.
///
/// A size already within the bound is cleared, leaving the choice to the
/// remote autoscaler. A size outside it is submitted clamped.
///
/// Returns whether disk autoscaling is enabled for the region.
fn merge_autoscaled_sizes(region: &mut RegionConfig) -> Result<bool> {
    let policy = match region.auto_scaling.clone() {
        Some(policy) => policy,
        None => return Ok(false),
    };

    if policy.enabled_compute().is_some() {
        for slot in NodeSlot::ALL {
            let spec = match region.node_spec_mut(slot) {
                Some(spec) => spec,
                None => continue,
            };

            let size = normalize_instance_size(&spec.instance_size, Some(&policy))?;
            spec.instance_size = if size == spec.instance_size {
                String::new()
            } else {
                size
            };
        }
    }

    Ok(policy.disk_enabled())
}
