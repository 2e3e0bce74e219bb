//! Transit network value objects returned by data providers.

use super::{RouteId, StopId};
use serde::{Deserialize, Serialize};

/// A stop with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Stop identifier.
    pub id: StopId,
    /// Human-readable name.
    pub name: String,
    /// Latitude, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Stop {
    /// Creates a stop without coordinates.
    #[must_use]
    pub fn new(id: StopId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }
}

/// A route with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier.
    pub id: RouteId,
    /// Human-readable name (`Red Line`).
    pub name: String,
}

impl Route {
    /// Creates a route.
    #[must_use]
    pub fn new(id: RouteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A service alert affecting a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Provider alert identifier.
    pub id: String,
    /// Affected route.
    pub route: RouteId,
    /// One-line summary.
    pub header: String,
    /// Effect keyword (`DELAY`, `SHUTTLE`, ...).
    #[serde(default)]
    pub effect: Option<String>,
}
