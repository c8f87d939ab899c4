//! Autoscaling Normalization
//!
//! Keeps a declared instance size inside the bounds of a region's compute
//! autoscaling policy.

use super::instance_size::InstanceSize;
use super::{AutoscalingPolicy, ComputeAutoscaling};
use crate::error::{Error, Result};

impl ComputeAutoscaling {
    /// Validate the policy bound and return it parsed as `(min, max)`
    pub fn bounds(&self) -> Result<(InstanceSize, InstanceSize)> {
        let min = InstanceSize::parse(&self.min_instance_size)?;
        let max = InstanceSize::parse(&self.max_instance_size)?;

        if min > max {
            return Err(Error::InvalidInstanceSize(format!(
                "autoscaling minimum {} is above maximum {}",
                min, max
            )));
        }

        Ok((min, max))
    }
}

impl AutoscalingPolicy {
    /// Validate the policy. Only an enabled compute sub-policy carries
    /// constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(compute) = self.enabled_compute() {
            compute.bounds()?;
        }
        Ok(())
    }
}

/// Clamp `current_size` into the compute autoscaling bounds of `policy`.
///
/// Returns `current_size` unchanged when there is no policy, compute
/// autoscaling is disabled, the size is already within bounds, or the size
/// is unset (empty).
pub fn normalize_instance_size(
    current_size: &str,
    policy: Option<&AutoscalingPolicy>,
) -> Result<String> {
    let compute = match policy.and_then(|p| p.enabled_compute()) {
        Some(compute) => compute,
        None => return Ok(current_size.to_string()),
    };

    let (min, max) = compute.bounds()?;

    if current_size.is_empty() {
        return Ok(String::new());
    }

    let current = InstanceSize::parse(current_size)?;

    if current < min {
        tracing::warn!(
            "Instance size {} is below the autoscaling minimum, using {}. Consider updating the resource",
            current_size,
            compute.min_instance_size
        );
        return Ok(compute.min_instance_size.clone());
    }

    if current > max {
        tracing::warn!(
            "Instance size {} is above the autoscaling maximum, using {}. Consider updating the resource",
            current_size,
            compute.max_instance_size
        );
        return Ok(compute.max_instance_size.clone());
    }

    Ok(current_size.to_string())
}
