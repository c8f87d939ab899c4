//! Resource Version Gate
//!
//! Resources are labelled with the version of the tooling that wrote them.
//! A resource written by a newer version than the running one may use
//! fields this version does not understand, so it is rejected unless the
//! user explicitly allows it.

use semver::Version;

use super::{ObjectMeta, PolicyValue, VersionPolicy, RESOURCE_VERSION_LABEL};
use crate::error::{Error, Result};

/// Check if the resource's declared version is compatible with
/// `system_version`.
///
/// A resource without a version label is always valid.
pub fn resource_version_is_valid(meta: &ObjectMeta, system_version: &Version) -> Result<bool> {
    let raw = match meta.label(RESOURCE_VERSION_LABEL) {
        Some(raw) => raw,
        None => return Ok(true),
    };

    let declared = Version::parse(raw).map_err(|source| Error::InvalidVersion {
        value: raw.to_string(),
        source,
    })?;

    if declared <= *system_version {
        return Ok(true);
    }

    match PolicyValue::<VersionPolicy>::read(meta).effective() {
        VersionPolicy::Allow => {
            tracing::info!(
                resource = %meta.name,
                "Resource version {} is newer than {}, accepted by override",
                declared,
                system_version
            );
            Ok(true)
        }
        VersionPolicy::Enforce => Ok(false),
    }
}
