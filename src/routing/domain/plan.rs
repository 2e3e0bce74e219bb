//! Execution plans.

use crate::directory::domain::CapabilityTag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which path serves a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// One capability, one agent, lowest latency.
    Fast,
    /// Several agents coordinated in a session.
    Coordinated,
}

impl PathKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Coordinated => "coordinated",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path decision plus the capabilities to involve.
///
/// The primary capability is always present and never repeated among the
/// secondaries. Fast plans have no secondaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    kind: PathKind,
    primary: CapabilityTag,
    secondaries: Vec<CapabilityTag>,
}

impl ExecutionPlan {
    /// Creates a fast plan for `capability`.
    #[must_use]
    pub const fn fast(capability: CapabilityTag) -> Self {
        Self {
            kind: PathKind::Fast,
            primary: capability,
            secondaries: Vec::new(),
        }
    }

    /// Creates a coordinated plan led by `primary`.
    ///
    /// Secondaries equal to the primary or repeated are dropped.
    #[must_use]
    pub fn coordinated(
        primary: CapabilityTag,
        secondaries: impl IntoIterator<Item = CapabilityTag>,
    ) -> Self {
        let mut kept: Vec<CapabilityTag> = Vec::new();
        for capability in secondaries {
            if capability != primary && !kept.contains(&capability) {
                kept.push(capability);
            }
        }
        Self {
            kind: PathKind::Coordinated,
            primary,
            secondaries: kept,
        }
    }

    /// Returns the path kind.
    #[must_use]
    pub const fn kind(&self) -> PathKind {
        self.kind
    }

    /// Returns the primary capability.
    #[must_use]
    pub const fn primary(&self) -> &CapabilityTag {
        &self.primary
    }

    /// Returns the capabilities other than the primary.
    #[must_use]
    pub fn secondaries(&self) -> &[CapabilityTag] {
        &self.secondaries
    }

    /// Returns every capability, primary first.
    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityTag> {
        std::iter::once(&self.primary).chain(&self.secondaries)
    }

    /// Returns the number of capabilities involved.
    #[must_use]
    pub fn capability_count(&self) -> usize {
        1 + self.secondaries.len()
    }
}
