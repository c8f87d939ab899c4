//! Deployment Comparison
//!
//! Decides whether a merged spec differs from the observed one enough to
//! warrant a write to the remote API.
//!
//! The comparison is one-sided. The first spec is the one that would be
//! submitted: any leaf it leaves unset (`None`, empty string, zero count)
//! inherits the observed value and always matches. A leaf it does set must
//! equal the observed leaf, where an observed `None` stands for the zero
//! value. The reported paths are for logs only; the whole merged spec is
//! always submitted.

use std::fmt::Debug;

use super::{AutoscalingPolicy, ComputeAutoscaling, DeploymentSpec, NodeSlot, NodeSpec, RegionConfig, ReplicationUnit};

/// Compare a merged spec against the observed one.
///
/// Returns whether they are equal, and the paths of mismatched fields.
pub fn deployments_equal(merged: &DeploymentSpec, observed: &DeploymentSpec) -> (bool, Vec<String>) {
    let mut differ = Differ::default();
    differ.deployment(merged, observed);

    if !differ.paths.is_empty() {
        tracing::debug!(
            differences = differ.paths.len(),
            "Deployments are different: {}",
            differ.paths.join("; ")
        );
    }

    (differ.paths.is_empty(), differ.paths)
}

/// Values with a zero state that counts as "unset"
trait Unset {
    fn is_unset(&self) -> bool;
}

impl Unset for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Unset for u32 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for u64 {
    fn is_unset(&self) -> bool {
        *self == 0
    }
}

impl Unset for bool {
    fn is_unset(&self) -> bool {
        !*self
    }
}

#[derive(Default)]
struct Differ {
    paths: Vec<String>,
}

impl Differ {
    fn leaf<T: Unset + PartialEq + Debug>(&mut self, path: &str, merged: &T, observed: &T) {
        if !merged.is_unset() && merged != observed {
            self.paths.push(format!("{}: {:?} != {:?}", path, merged, observed));
        }
    }

    fn optional<T: Unset + PartialEq + Debug>(&mut self, path: &str, merged: &Option<T>, observed: &Option<T>) {
        let merged = match merged {
            Some(value) => value,
            None => return,
        };

        match observed {
            Some(value) if merged == value => {}
            None if merged.is_unset() => {}
            _ => self.paths.push(format!("{}: {:?} != {:?}", path, merged, observed)),
        }
    }

    fn length(&mut self, path: &str, merged: usize, observed: usize) -> bool {
        if merged != observed {
            self.paths.push(format!("{}: length {} != {}", path, merged, observed));
            return false;
        }
        true
    }

    fn deployment(&mut self, merged: &DeploymentSpec, observed: &DeploymentSpec) {
        self.optional("name", &merged.name, &observed.name);
        self.optional("clusterType", &merged.cluster_type, &observed.cluster_type);
        self.optional("diskSizeGB", &merged.disk_size_gb, &observed.disk_size_gb);

        if self.length(
            "replicationSpecs",
            merged.replication_specs.len(),
            observed.replication_specs.len(),
        ) {
            for (i, (m, o)) in merged
                .replication_specs
                .iter()
                .zip(&observed.replication_specs)
                .enumerate()
            {
                self.replication_unit(&format!("replicationSpecs[{}]", i), m, o);
            }
        }
    }

    fn replication_unit(&mut self, path: &str, merged: &ReplicationUnit, observed: &ReplicationUnit) {
        self.optional(&format!("{}.id", path), &merged.id, &observed.id);
        self.leaf(&format!("{}.numShards", path), &merged.shard_count, &observed.shard_count);
        self.leaf(&format!("{}.zoneName", path), &merged.zone_name, &observed.zone_name);

        let regions = format!("{}.regionConfigs", path);
        if self.length(&regions, merged.region_configs.len(), observed.region_configs.len()) {
            for (i, (m, o)) in merged
                .region_configs
                .iter()
                .zip(&observed.region_configs)
                .enumerate()
            {
                self.region(&format!("{}[{}]", regions, i), m, o);
            }
        }
    }

    fn region(&mut self, path: &str, merged: &RegionConfig, observed: &RegionConfig) {
        self.leaf(&format!("{}.regionName", path), &merged.region_name, &observed.region_name);
        self.leaf(&format!("{}.providerName", path), &merged.provider_name, &observed.provider_name);
        self.leaf(
            &format!("{}.backingProviderName", path),
            &merged.backing_provider_name,
            &observed.backing_provider_name,
        );
        self.optional(&format!("{}.priority", path), &merged.priority, &observed.priority);

        for slot in NodeSlot::ALL {
            if let Some(spec) = merged.node_spec(slot) {
                let fallback = NodeSpec::default();
                let observed_spec = observed.node_spec(slot).unwrap_or(&fallback);
                self.node_spec(&format!("{}.{}", path, slot), spec, observed_spec);
            }
        }

        if let Some(policy) = &merged.auto_scaling {
            let fallback = AutoscalingPolicy::default();
            let observed_policy = observed.auto_scaling.as_ref().unwrap_or(&fallback);
            self.autoscaling(&format!("{}.autoScaling", path), policy, observed_policy);
        }
    }

    fn node_spec(&mut self, path: &str, merged: &NodeSpec, observed: &NodeSpec) {
        self.leaf(&format!("{}.instanceSize", path), &merged.instance_size, &observed.instance_size);
        self.optional(&format!("{}.nodeCount", path), &merged.node_count, &observed.node_count);
        self.optional(&format!("{}.diskIOPS", path), &merged.disk_iops, &observed.disk_iops);
        self.leaf(&format!("{}.ebsVolumeType", path), &merged.ebs_volume_type, &observed.ebs_volume_type);
    }

    fn autoscaling(&mut self, path: &str, merged: &AutoscalingPolicy, observed: &AutoscalingPolicy) {
        if let Some(disk) = &merged.disk {
            let observed_enabled = observed.disk.as_ref().and_then(|d| d.enabled);
            self.optional(&format!("{}.diskGB.enabled", path), &disk.enabled, &observed_enabled);
        }

        if let Some(compute) = &merged.compute {
            let fallback = ComputeAutoscaling::default();
            let observed_compute = observed.compute.as_ref().unwrap_or(&fallback);
            let path = format!("{}.compute", path);
            self.optional(&format!("{}.enabled", path), &compute.enabled, &observed_compute.enabled);
            self.optional(
                &format!("{}.scaleDownEnabled", path),
                &compute.scale_down_enabled,
                &observed_compute.scale_down_enabled,
            );
            self.leaf(
                &format!("{}.minInstanceSize", path),
                &compute.min_instance_size,
                &observed_compute.min_instance_size,
            );
            self.leaf(
                &format!("{}.maxInstanceSize", path),
                &compute.max_instance_size,
                &observed_compute.max_instance_size,
            );
        }
    }
}
