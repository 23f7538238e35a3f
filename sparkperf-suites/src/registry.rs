//! Version-gated axis lists
//!
//! Some axes only exist for some platform versions. Rather than branching
//! while building option lists, a [`VersionedAxes`] holds a base list plus
//! gated additions and is resolved once against the configured version.

use sparkperf_common::PlatformVersion;

use crate::option::OptionAxis;

/// Condition on the platform version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    /// Enabled from this version on
    AtLeast(PlatformVersion),
    /// Enabled strictly before this version
    Below(PlatformVersion),
}

impl VersionGate {
    pub fn at_least(major: u32, minor: u32) -> Self {
        VersionGate::AtLeast(PlatformVersion::new(major, minor))
    }

    pub fn below(major: u32, minor: u32) -> Self {
        VersionGate::Below(PlatformVersion::new(major, minor))
    }

    pub fn allows(&self, version: PlatformVersion) -> bool {
        match self {
            VersionGate::AtLeast(min) => version >= *min,
            VersionGate::Below(max) => version < *max,
        }
    }
}

/// A base axis list plus additions that apply only for some versions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionedAxes {
    base: Vec<OptionAxis>,
    gates: Vec<(VersionGate, Vec<OptionAxis>)>,
}

impl VersionedAxes {
    pub fn new(base: Vec<OptionAxis>) -> Self {
        Self {
            base,
            gates: Vec::new(),
        }
    }

    /// Append `axes` when `gate` allows the resolved version.
    pub fn gated(mut self, gate: VersionGate, axes: Vec<OptionAxis>) -> Self {
        self.gates.push((gate, axes));
        self
    }

    /// Base axes followed by every allowed gate's axes, in declaration order.
    pub fn resolve(&self, version: PlatformVersion) -> Vec<OptionAxis> {
        let mut axes = self.base.clone();
        for (gate, extra) in &self.gates {
            if gate.allows(version) {
                axes.extend(extra.iter().cloned());
            }
        }
        axes
    }
}
