//! Governance Gates
//!
//! Predicates over resource metadata that decide whether a resource should
//! be reconciled, removed from the remote system on deletion, or accepted at
//! all. Policies are set by the user through annotations whose values are
//! closed sentinel sets; anything else falls back to the policy default.

pub mod version;

pub use version::resource_version_is_valid;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Annotation selecting what happens to the remote resource on deletion
pub const RESOURCE_POLICY_ANNOTATION: &str = "wolfdeploy.io/resource-policy";

/// Annotation allowing reconciliation to be paused
pub const RECONCILIATION_POLICY_ANNOTATION: &str = "wolfdeploy.io/reconciliation-policy";

/// Label carrying the version of the tooling that last wrote the resource
pub const RESOURCE_VERSION_LABEL: &str = "wolfdeploy.io/resource-version";

/// Annotation overriding the version compatibility check
pub const RESOURCE_VERSION_OVERRIDE_ANNOTATION: &str = "wolfdeploy.io/resource-version-policy";

/// Resource metadata consumed by the gates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

/// Reference from a child resource to its parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,

    /// Parent namespace; the child's own namespace when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A policy that can be selected through an annotation sentinel
pub trait SentinelPolicy: Copy + Default {
    /// Annotation holding the sentinel
    const ANNOTATION: &'static str;

    /// Map a sentinel value to a policy, `None` for unrecognized values
    fn from_sentinel(value: &str) -> Option<Self>;
}

/// State of a policy annotation on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyValue<'a, P> {
    Absent,
    Recognized(P),
    Unrecognized(&'a str),
}

impl<'a, P: SentinelPolicy> PolicyValue<'a, P> {
    /// Read the policy annotation from resource metadata
    pub fn read(meta: &'a ObjectMeta) -> Self {
        match meta.annotation(P::ANNOTATION) {
            None => PolicyValue::Absent,
            Some(raw) => match P::from_sentinel(raw) {
                Some(policy) => PolicyValue::Recognized(policy),
                None => PolicyValue::Unrecognized(raw),
            },
        }
    }

    /// The policy in force; absent and unrecognized values give the default
    pub fn effective(&self) -> P {
        match self {
            PolicyValue::Recognized(policy) => *policy,
            PolicyValue::Unrecognized(raw) => {
                tracing::debug!(
                    annotation = P::ANNOTATION,
                    "Ignoring unrecognized policy value {:?}",
                    raw
                );
                P::default()
            }
            PolicyValue::Absent => P::default(),
        }
    }
}

/// What happens to the remote resource when the declaring resource is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionPolicy {
    Keep,
    #[default]
    Purge,
}

impl std::fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionPolicy::Keep => write!(f, "keep"),
            DeletionPolicy::Purge => write!(f, "purge"),
        }
    }
}

impl SentinelPolicy for DeletionPolicy {
    const ANNOTATION: &'static str = RESOURCE_POLICY_ANNOTATION;

    fn from_sentinel(value: &str) -> Option<Self> {
        match value {
            "keep" => Some(DeletionPolicy::Keep),
            _ => None,
        }
    }
}

/// Whether the resource is reconciled at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconciliationPolicy {
    Skip,
    #[default]
    Reconcile,
}

impl SentinelPolicy for ReconciliationPolicy {
    const ANNOTATION: &'static str = RECONCILIATION_POLICY_ANNOTATION;

    fn from_sentinel(value: &str) -> Option<Self> {
        match value {
            "skip" => Some(ReconciliationPolicy::Skip),
            _ => None,
        }
    }
}

/// Whether resources written by newer tooling are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionPolicy {
    Allow,
    #[default]
    Enforce,
}

impl SentinelPolicy for VersionPolicy {
    const ANNOTATION: &'static str = RESOURCE_VERSION_OVERRIDE_ANNOTATION;

    fn from_sentinel(value: &str) -> Option<Self> {
        match value {
            "allow" => Some(VersionPolicy::Allow),
            _ => None,
        }
    }
}

/// Check if `reference`, declared by `child`, points at `parent`
pub fn resource_ownership_matches(child: &ObjectMeta, reference: &ResourceRef, parent: &ObjectMeta) -> bool {
    if reference.name != parent.name {
        return false;
    }

    let namespace = reference.namespace.as_deref().unwrap_or(&child.namespace);
    namespace == parent.namespace
}

/// Check if the remote resource must survive deletion of the declaring one
pub fn should_leave_in_remote_system(meta: &ObjectMeta) -> bool {
    PolicyValue::<DeletionPolicy>::read(meta).effective() == DeletionPolicy::Keep
}

/// Check if reconciliation of the resource is paused
pub fn reconciliation_should_be_skipped(meta: &ObjectMeta) -> bool {
    PolicyValue::<ReconciliationPolicy>::read(meta).effective() == ReconciliationPolicy::Skip
}
