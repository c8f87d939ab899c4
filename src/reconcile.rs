//! Reconcile Planning
//!
//! Composes the governance gates, the merge and the comparison into one
//! decision for an external reconciliation driver: gate checks, then merge,
//! then diff. The planner never talks to the remote API; it only says what
//! should be submitted.

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::config::WolfDeployConfig;
use crate::deployment::{deployments_equal, merge_topology, DeploymentSpec};
use crate::error::Result;
use crate::governance::{
    reconciliation_should_be_skipped, resource_version_is_valid, DeletionPolicy, ObjectMeta,
    PolicyValue,
};

/// A declared deployment resource: metadata plus desired spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResource {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
}

/// What the driver should do for one reconciliation attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ReconcileDecision {
    /// Reconciliation is paused by annotation
    Skip,
    /// The resource was written by a newer version than this one
    #[serde(rename_all = "camelCase")]
    VersionRejected { resource_version: String, system_version: String },
    /// The remote deployment already matches
    UpToDate,
    /// Submit `merged` to the remote API
    Update {
        merged: DeploymentSpec,
        differences: Vec<String>,
    },
}

/// Reconcile planner bound to the running system version
#[derive(Debug, Clone)]
pub struct Reconciler {
    system_version: Version,
}

impl Reconciler {
    pub fn new(system_version: Version) -> Self {
        Self { system_version }
    }

    pub fn from_config(config: &WolfDeployConfig) -> Self {
        Self::new(config.system_version().clone())
    }

    /// Plan one reconciliation of `resource` against the `observed` spec
    pub fn plan(&self, resource: &DeploymentResource, observed: &DeploymentSpec) -> Result<ReconcileDecision> {
        let meta = &resource.metadata;

        if reconciliation_should_be_skipped(meta) {
            tracing::info!(resource = %meta.name, "Reconciliation skipped by policy annotation");
            return Ok(ReconcileDecision::Skip);
        }

        if !resource_version_is_valid(meta, &self.system_version)? {
            let resource_version = meta
                .label(crate::governance::RESOURCE_VERSION_LABEL)
                .unwrap_or_default()
                .to_string();
            tracing::warn!(
                resource = %meta.name,
                "Resource version {} is newer than {}, not reconciling",
                resource_version,
                self.system_version
            );
            return Ok(ReconcileDecision::VersionRejected {
                resource_version,
                system_version: self.system_version.to_string(),
            });
        }

        let result = merge_topology(&resource.spec, observed)?;
        let (equal, differences) = deployments_equal(&result.merged, &result.observed);

        if equal {
            tracing::info!(resource = %meta.name, "Deployment is up to date");
            return Ok(ReconcileDecision::UpToDate);
        }

        tracing::info!(
            resource = %meta.name,
            differences = differences.len(),
            "Deployment differs from the remote state, update required"
        );
        Ok(ReconcileDecision::Update {
            merged: result.merged,
            differences,
        })
    }

    /// Decide what happens to the remote deployment when `meta`'s resource
    /// is deleted
    pub fn plan_deletion(&self, meta: &ObjectMeta) -> DeletionPolicy {
        PolicyValue::<DeletionPolicy>::read(meta).effective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::{AutoscalingPolicy, ComputeAutoscaling, NodeSpec, RegionConfig, ReplicationUnit};
    use crate::governance::{
        RECONCILIATION_POLICY_ANNOTATION, RESOURCE_POLICY_ANNOTATION, RESOURCE_VERSION_LABEL,
    };
    use crate::Error;

    fn spec(size: &str, auto_scaling: Option<AutoscalingPolicy>) -> DeploymentSpec {
        DeploymentSpec {
            replication_specs: vec![ReplicationUnit {
                shard_count: 1,
                zone_name: "Zone 1".into(),
                region_configs: vec![RegionConfig {
                    region_name: "US_EAST_1".into(),
                    provider_name: "AWS".into(),
                    electable: Some(NodeSpec {
                        instance_size: size.into(),
                        node_count: Some(3),
                        ..Default::default()
                    }),
                    auto_scaling,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn resource(spec: DeploymentSpec) -> DeploymentResource {
        DeploymentResource {
            metadata: ObjectMeta::new("orders", "prod"),
            spec,
        }
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(Version::new(1, 3, 0))
    }

    #[test]
    fn test_up_to_date() {
        let decision = reconciler().plan(&resource(spec("M10", None)), &spec("M10", None)).unwrap();
        assert_eq!(decision, ReconcileDecision::UpToDate);
    }

    #[test]
    fn test_update_carries_merged_spec() {
        let decision = reconciler().plan(&resource(spec("M20", None)), &spec("M10", None)).unwrap();
        match decision {
            ReconcileDecision::Update { merged, differences } => {
                assert_eq!(merged, spec("M20", None));
                assert_eq!(differences.len(), 1);
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_autoscaled_size_does_not_force_update() {
        let policy = AutoscalingPolicy {
            disk: None,
            compute: Some(ComputeAutoscaling {
                enabled: Some(true),
                scale_down_enabled: Some(true),
                min_instance_size: "M10".into(),
                max_instance_size: "M40".into(),
            }),
        };
        let mut observed = spec("M30", Some(policy.clone()));
        observed.disk_size_gb = Some(40);

        let decision = reconciler().plan(&resource(spec("M30", Some(policy))), &observed).unwrap();
        assert_eq!(decision, ReconcileDecision::UpToDate);
    }

    #[test]
    fn test_skip_annotation_wins() {
        let mut res = resource(spec("M20", None));
        res.metadata = res.metadata.with_annotation(RECONCILIATION_POLICY_ANNOTATION, "skip");
        assert_eq!(reconciler().plan(&res, &spec("M10", None)).unwrap(), ReconcileDecision::Skip);
    }

    #[test]
    fn test_newer_resource_rejected() {
        let mut res = resource(spec("M20", None));
        res.metadata = res.metadata.with_label(RESOURCE_VERSION_LABEL, "1.5.0");

        assert_eq!(
            reconciler().plan(&res, &spec("M10", None)).unwrap(),
            ReconcileDecision::VersionRejected {
                resource_version: "1.5.0".into(),
                system_version: "1.3.0".into(),
            }
        );
    }

    #[test]
    fn test_decision_document() {
        let decision = ReconcileDecision::VersionRejected {
            resource_version: "1.5.0".into(),
            system_version: "1.3.0".into(),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "action": "versionRejected",
                "resourceVersion": "1.5.0",
                "systemVersion": "1.3.0",
            })
        );

        let json = serde_json::to_value(ReconcileDecision::UpToDate).unwrap();
        assert_eq!(json, serde_json::json!({"action": "upToDate"}));
    }

    #[test]
    fn test_errors_propagate() {
        let mut res = resource(spec("M20", None));
        res.metadata = res.metadata.with_label(RESOURCE_VERSION_LABEL, "next");
        assert!(matches!(
            reconciler().plan(&res, &spec("M10", None)),
            Err(Error::InvalidVersion { .. })
        ));

        let mut sharded = spec("M10", None);
        sharded.replication_specs.push(ReplicationUnit::default());
        assert!(matches!(
            reconciler().plan(&resource(sharded), &spec("M10", None)),
            Err(Error::TopologyMismatch { .. })
        ));
    }

    #[test]
    fn test_deletion_policy() {
        let meta = ObjectMeta::new("orders", "prod");
        assert_eq!(reconciler().plan_deletion(&meta), DeletionPolicy::Purge);

        let meta = meta.with_annotation(RESOURCE_POLICY_ANNOTATION, "keep");
        assert_eq!(reconciler().plan_deletion(&meta), DeletionPolicy::Keep);
    }

    #[test]
    fn test_resource_document() {
        let json = r#"{
            "metadata": {"name": "orders", "namespace": "prod",
                         "annotations": {"wolfdeploy.io/resource-policy": "keep"}},
            "spec": {"replicationSpecs": []}
        }"#;
        let res: DeploymentResource = serde_json::from_str(json).unwrap();
        assert_eq!(res.metadata.annotation(RESOURCE_POLICY_ANNOTATION), Some("keep"));
        assert!(res.spec.replication_specs.is_empty());
    }
}
