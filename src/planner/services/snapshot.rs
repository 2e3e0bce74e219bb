//! Builds a [`RouteGraph`] snapshot for one origin/destination pair.

use crate::planner::domain::{Route, RouteGraph, RouteId, Stop, StopId};
use crate::planner::ports::{TransitDataProvider, TransitDataResult};
use futures_util::future::try_join_all;
use std::collections::BTreeMap;

/// Route graph plus the names needed to describe a trip.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    /// Graph over every route serving the origin or the destination.
    pub graph: RouteGraph,
    routes: BTreeMap<RouteId, Route>,
    stops: BTreeMap<StopId, Stop>,
}

impl NetworkSnapshot {
    /// Returns the display name of `route`, falling back to its id.
    #[must_use]
    pub fn route_name<'a>(&'a self, route: &'a RouteId) -> &'a str {
        self.routes
            .get(route)
            .map_or_else(|| route.as_str(), |known| known.name.as_str())
    }

    /// Returns the display name of `stop`, falling back to its id.
    #[must_use]
    pub fn stop_name<'a>(&'a self, stop: &'a StopId) -> &'a str {
        self.stops
            .get(stop)
            .map_or_else(|| stop.as_str(), |known| known.name.as_str())
    }
}

/// Loads every route serving `origin` or `destination` with its stops.
///
/// Stop lists are fetched concurrently, one request per distinct route.
///
/// # Errors
///
/// Propagates the first provider failure.
pub async fn load_snapshot<P>(
    provider: &P,
    origin: &StopId,
    destination: &StopId,
) -> TransitDataResult<NetworkSnapshot>
where
    P: TransitDataProvider + ?Sized,
{
    let (origin_routes, destination_routes) =
        tokio::try_join!(provider.routes_at(origin), provider.routes_at(destination))?;

    let routes: BTreeMap<RouteId, Route> = origin_routes
        .into_iter()
        .chain(destination_routes)
        .map(|route| (route.id.clone(), route))
        .collect();

    let stop_lists = try_join_all(routes.keys().map(|route| async move {
        provider
            .stops(route)
            .await
            .map(|stops| (route.clone(), stops))
    }))
    .await?;

    let mut stops = BTreeMap::new();
    let mut sequences = Vec::with_capacity(stop_lists.len());
    for (route, route_stops) in stop_lists {
        sequences.push((
            route,
            route_stops.iter().map(|stop| stop.id.clone()).collect(),
        ));
        for stop in route_stops {
            stops.entry(stop.id.clone()).or_insert(stop);
        }
    }

    let graph = RouteGraph::from_routes(sequences);
    tracing::debug!(
        origin = %origin,
        destination = %destination,
        routes = graph.route_count(),
        "route graph snapshot loaded"
    );
    Ok(NetworkSnapshot {
        graph,
        routes,
        stops,
    })
}
