//! Deployment Spec Module
//!
//! Data model for a multi-region, shardable database deployment, together
//! with the merge, normalization and comparison steps that turn a desired
//! spec into one that can be submitted to the remote API.
//!
//! The same types describe both sides: the desired spec decoded from the
//! user's resource and the observed spec reported by the remote API.

pub mod instance_size;
pub mod autoscaling;
pub mod merge;
pub mod diff;

pub use instance_size::{InstanceSize, InstanceFamily, SizeModifier, compare_instance_sizes};
pub use autoscaling::normalize_instance_size;
pub use merge::{merge_topology, MergedDeployment};
pub use diff::deployments_equal;

use serde::{Deserialize, Serialize};

/// Top-level deployment spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Cluster type (REPLICASET, SHARDED, GEOSHARDED)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<String>,

    /// Cluster-wide disk size in gigabytes
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,

    /// Replication topology, paired positionally with the observed one
    #[serde(default)]
    pub replication_specs: Vec<ReplicationUnit>,
}

/// One replication spec (a zone of shards)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationUnit {
    /// Identifier assigned by the remote system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Number of shards (0 = unset)
    #[serde(default, rename = "numShards")]
    pub shard_count: u32,

    /// Zone label
    #[serde(default)]
    pub zone_name: String,

    /// Per-region configuration
    #[serde(default)]
    pub region_configs: Vec<RegionConfig>,
}

/// Configuration of one region inside a replication spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionConfig {
    #[serde(default)]
    pub region_name: String,

    #[serde(default)]
    pub provider_name: String,

    /// Real cloud behind a tenant-style provider; assigned by the remote system
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub backing_provider_name: String,

    /// Election priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default, rename = "electableSpecs", skip_serializing_if = "Option::is_none")]
    pub electable: Option<NodeSpec>,

    #[serde(default, rename = "readOnlySpecs", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<NodeSpec>,

    #[serde(default, rename = "analyticsSpecs", skip_serializing_if = "Option::is_none")]
    pub analytics: Option<NodeSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scaling: Option<AutoscalingPolicy>,
}

/// The node groups a region can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSlot {
    Electable,
    ReadOnly,
    Analytics,
}

impl NodeSlot {
    pub const ALL: [NodeSlot; 3] = [NodeSlot::Electable, NodeSlot::ReadOnly, NodeSlot::Analytics];

    /// Field name as it appears in deployment documents
    pub fn field_name(&self) -> &'static str {
        match self {
            NodeSlot::Electable => "electableSpecs",
            NodeSlot::ReadOnly => "readOnlySpecs",
            NodeSlot::Analytics => "analyticsSpecs",
        }
    }
}

impl std::fmt::Display for NodeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

impl RegionConfig {
    pub fn node_spec(&self, slot: NodeSlot) -> Option<&NodeSpec> {
        match slot {
            NodeSlot::Electable => self.electable.as_ref(),
            NodeSlot::ReadOnly => self.read_only.as_ref(),
            NodeSlot::Analytics => self.analytics.as_ref(),
        }
    }

    pub fn node_spec_mut(&mut self, slot: NodeSlot) -> Option<&mut NodeSpec> {
        match slot {
            NodeSlot::Electable => self.electable.as_mut(),
            NodeSlot::ReadOnly => self.read_only.as_mut(),
            NodeSlot::Analytics => self.analytics.as_mut(),
        }
    }
}

/// Hardware spec of one node group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Instance size name (empty = unset/inherit)
    #[serde(default)]
    pub instance_size: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,

    #[serde(default, rename = "diskIOPS", skip_serializing_if = "Option::is_none")]
    pub disk_iops: Option<u64>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ebs_volume_type: String,
}

/// Autoscaling policy of a region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingPolicy {
    #[serde(default, rename = "diskGB", skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskAutoscaling>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute: Option<ComputeAutoscaling>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskAutoscaling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeAutoscaling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_down_enabled: Option<bool>,

    #[serde(default)]
    pub min_instance_size: String,

    #[serde(default)]
    pub max_instance_size: String,
}

impl AutoscalingPolicy {
    /// Check if disk autoscaling is switched on
    pub fn disk_enabled(&self) -> bool {
        self.disk
            .as_ref()
            .and_then(|d| d.enabled)
            .unwrap_or(false)
    }

    /// Get the compute sub-policy if it is switched on
    pub fn enabled_compute(&self) -> Option<&ComputeAutoscaling> {
        self.compute
            .as_ref()
            .filter(|c| c.enabled.unwrap_or(false))
    }
}
