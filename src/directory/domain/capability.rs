//! Capability tags advertised by agents.

use super::DirectoryDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tags served by the transit agents shipped with this crate.
pub mod well_known {
    /// Trip planning between two stops.
    pub const TRIP_PLANNING: &str = "trip_planning";
    /// Service alerts for a route.
    pub const SERVICE_ALERTS: &str = "service_alerts";
    /// Stop lookup by name.
    pub const STOP_INFO: &str = "stop_info";

    /// All well-known tags in canonical order.
    pub const ALL: [&str; 3] = [TRIP_PLANNING, SERVICE_ALERTS, STOP_INFO];
}

/// Validated capability tag such as `trip_planning`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityTag(String);

impl CapabilityTag {
    /// Creates a validated capability tag.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyCapabilityTag`] when the value is
    /// blank or [`DirectoryDomainError::InvalidCapabilityTag`] when it contains
    /// characters outside `[a-z0-9_-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(DirectoryDomainError::EmptyCapabilityTag);
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !is_valid {
            return Err(DirectoryDomainError::InvalidCapabilityTag(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `trip_planning` tag.
    #[must_use]
    pub fn trip_planning() -> Self {
        Self(well_known::TRIP_PLANNING.to_owned())
    }

    /// Returns the `service_alerts` tag.
    #[must_use]
    pub fn service_alerts() -> Self {
        Self(well_known::SERVICE_ALERTS.to_owned())
    }

    /// Returns the `stop_info` tag.
    #[must_use]
    pub fn stop_info() -> Self {
        Self(well_known::STOP_INFO.to_owned())
    }

    /// Returns every well-known tag in canonical order.
    #[must_use]
    pub fn all_well_known() -> Vec<Self> {
        well_known::ALL
            .iter()
            .map(|raw| Self((*raw).to_owned()))
            .collect()
    }
}

impl fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CapabilityTag {
    type Error = DirectoryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CapabilityTag> for String {
    fn from(value: CapabilityTag) -> Self {
        value.0
    }
}
