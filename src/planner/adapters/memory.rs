//! Static in-memory transit network.

use crate::planner::domain::{Alert, Route, RouteId, Stop, StopId};
use crate::planner::ports::{TransitDataProvider, TransitDataResult};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Fixed network assembled in code, used by tests and offline agents.
#[derive(Debug, Clone, Default)]
pub struct StaticTransitData {
    stops: BTreeMap<StopId, Stop>,
    routes: BTreeMap<RouteId, (Route, Vec<StopId>)>,
    alerts: Vec<Alert>,
}

impl StaticTransitData {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop.
    #[must_use]
    pub fn with_stop(mut self, stop: Stop) -> Self {
        self.stops.insert(stop.id.clone(), stop);
        self
    }

    /// Adds a route calling at `stops` in order.
    ///
    /// Stops not added beforehand are created with their id as name.
    #[must_use]
    pub fn with_route(mut self, route: Route, stops: Vec<StopId>) -> Self {
        for stop in &stops {
            self.stops
                .entry(stop.clone())
                .or_insert_with(|| Stop::new(stop.clone(), stop.as_str()));
        }
        self.routes.insert(route.id.clone(), (route, stops));
        self
    }

    /// Adds an alert.
    #[must_use]
    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alerts.push(alert);
        self
    }
}

#[async_trait]
impl TransitDataProvider for StaticTransitData {
    async fn stops(&self, route: &RouteId) -> TransitDataResult<Vec<Stop>> {
        Ok(self
            .routes
            .get(route)
            .map(|(_, stops)| {
                stops
                    .iter()
                    .filter_map(|id| self.stops.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn routes_at(&self, stop: &StopId) -> TransitDataResult<Vec<Route>> {
        Ok(self
            .routes
            .values()
            .filter(|(_, stops)| stops.contains(stop))
            .map(|(route, _)| route.clone())
            .collect())
    }

    async fn alerts(&self, route: &RouteId) -> TransitDataResult<Vec<Alert>> {
        Ok(self
            .alerts
            .iter()
            .filter(|alert| &alert.route == route)
            .cloned()
            .collect())
    }

    async fn find_stop(&self, name: &str) -> TransitDataResult<Option<Stop>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self
            .stops
            .values()
            .find(|stop| stop.name.to_lowercase().contains(&needle))
            .cloned())
    }

    async fn find_route(&self, name: &str) -> TransitDataResult<Option<Route>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(self
            .routes
            .values()
            .map(|(route, _)| route)
            .find(|route| {
                route.id.as_str().to_lowercase() == needle
                    || route.name.to_lowercase().contains(&needle)
            })
            .cloned())
    }
}
