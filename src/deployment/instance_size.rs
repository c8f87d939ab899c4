//! Instance Size Names
//!
//! Parses and orders instance size identifiers such as `M10`, `R40` or
//! `M40_NVME`.
//!
//! Name structure:
//! - family letter: `M` (general) or `R` (low CPU)
//! - numeric tier: `0`, `2`, `5`, `10`, `20`, ...
//! - optional modifier: `_LOW_CPU` or `_NVME`
//!
//! Sizes order by tier first. Family and modifier only break ties, so the
//! order is total: two names compare equal only when they are identical.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static INSTANCE_SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<family>[MR])(?P<tier>0|[1-9]\d*)(?P<modifier>_LOW_CPU|_NVME)?$")
        .expect("Invalid instance size regex")
});

/// Instance family letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstanceFamily {
    M,
    R,
}

/// Suffix that changes the hardware profile but not the tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeModifier {
    LowCpu,
    Nvme,
}

/// A parsed instance size name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceSize {
    pub family: InstanceFamily,
    pub tier: u32,
    pub modifier: Option<SizeModifier>,
}

impl InstanceSize {
    /// Parse an instance size name
    pub fn parse(name: &str) -> Result<Self> {
        let caps = INSTANCE_SIZE_PATTERN
            .captures(name)
            .ok_or_else(|| Error::InvalidInstanceSize(format!("{:?}", name)))?;

        let family = match &caps["family"] {
            "M" => InstanceFamily::M,
            _ => InstanceFamily::R,
        };

        let tier = caps["tier"]
            .parse::<u32>()
            .map_err(|_| Error::InvalidInstanceSize(format!("{:?}: tier out of range", name)))?;

        let modifier = caps.name("modifier").map(|m| match m.as_str() {
            "_NVME" => SizeModifier::Nvme,
            _ => SizeModifier::LowCpu,
        });

        Ok(Self { family, tier, modifier })
    }
}

impl FromStr for InstanceSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Ord for InstanceSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then(self.family.cmp(&other.family))
            .then(self.modifier.cmp(&other.modifier))
    }
}

impl PartialOrd for InstanceSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for InstanceSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let family = match self.family {
            InstanceFamily::M => "M",
            InstanceFamily::R => "R",
        };
        let modifier = match self.modifier {
            Some(SizeModifier::LowCpu) => "_LOW_CPU",
            Some(SizeModifier::Nvme) => "_NVME",
            None => "",
        };
        write!(f, "{}{}{}", family, self.tier, modifier)
    }
}

/// Compare two instance size names, failing if either is not a valid name
pub fn compare_instance_sizes(a: &str, b: &str) -> Result<Ordering> {
    Ok(InstanceSize::parse(a)?.cmp(&InstanceSize::parse(b)?))
}
