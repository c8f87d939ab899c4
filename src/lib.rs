//! WolfDeploy - Deployment Reconciliation Planner
//!
//! Reconciles a user-declared deployment spec for a multi-region, shardable
//! database against the state reported by the remote managed-service API,
//! producing a spec that can be submitted without clobbering values the
//! remote system assigns itself.
//!
//! # Architecture
//!
//! Every step is a pure, synchronous function. An external driver owns the
//! remote API client and the watch loop and composes the steps:
//! governance gates, then merge, then comparison, then (maybe) submit.
//!
//! # Features
//!
//! - Instance size ordering for the `M`/`R` families
//! - Autoscaling-aware clamping of declared instance sizes
//! - Desired/observed merge that clears remote-authoritative fields
//! - One-sided deep comparison with diagnostic field paths
//! - Annotation and version based governance gates

pub mod config;
pub mod error;
pub mod deployment;
pub mod governance;
pub mod reconcile;

pub use config::WolfDeployConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::WolfDeployConfig;
    pub use crate::error::{Error, Result};
    pub use crate::deployment::{
        deployments_equal, merge_topology, normalize_instance_size, DeploymentSpec, InstanceSize,
        MergedDeployment,
    };
    pub use crate::governance::{
        reconciliation_should_be_skipped, resource_ownership_matches, resource_version_is_valid,
        should_leave_in_remote_system, ObjectMeta, ResourceRef,
    };
    pub use crate::reconcile::{DeploymentResource, ReconcileDecision, Reconciler};
}
