//! Immutable route graph snapshot.

use super::{RouteId, StopId};
use std::collections::{BTreeMap, BTreeSet};

/// Routes as ordered stop sequences, indexed by stop.
///
/// A snapshot is built once per query and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGraph {
    routes: BTreeMap<RouteId, Vec<StopId>>,
    serving: BTreeMap<StopId, BTreeSet<RouteId>>,
}

impl RouteGraph {
    /// Builds a graph from `(route, ordered stops)` pairs.
    ///
    /// A route listed twice keeps its last stop sequence.
    pub fn from_routes<I>(routes: I) -> Self
    where
        I: IntoIterator<Item = (RouteId, Vec<StopId>)>,
    {
        let routes: BTreeMap<RouteId, Vec<StopId>> = routes.into_iter().collect();
        let mut serving: BTreeMap<StopId, BTreeSet<RouteId>> = BTreeMap::new();
        for (route, stops) in &routes {
            for stop in stops {
                serving
                    .entry(stop.clone())
                    .or_default()
                    .insert(route.clone());
            }
        }
        Self { routes, serving }
    }

    /// Returns the routes calling at `stop`, in ascending id order.
    #[must_use]
    pub fn routes_serving(&self, stop: &StopId) -> BTreeSet<RouteId> {
        self.serving.get(stop).cloned().unwrap_or_default()
    }

    /// Returns the ordered stops of `route`.
    #[must_use]
    pub fn stops_of(&self, route: &RouteId) -> &[StopId] {
        self.routes.get(route).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of stops traversed between `from` and `to` on
    /// `route`, in either direction.
    ///
    /// Stops that appear more than once (loops) use the shortest distance.
    #[must_use]
    pub fn distance(&self, route: &RouteId, from: &StopId, to: &StopId) -> Option<usize> {
        let stops = self.stops_of(route);
        positions(stops, from)
            .flat_map(|start| positions(stops, to).map(move |end| start.abs_diff(end)))
            .min()
    }

    /// Returns the number of routes in the snapshot.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}

fn positions<'a>(stops: &'a [StopId], target: &'a StopId) -> impl Iterator<Item = usize> + 'a {
    stops
        .iter()
        .enumerate()
        .filter(move |(_, stop)| *stop == target)
        .map(|(index, _)| index)
}
