//! One-transfer route search.

use super::{PlanError, RouteGraph, RouteId, StopId, TransferCandidate};

/// Finds a trip from `origin` to `destination` with at most one transfer.
///
/// A route serving both stops wins outright (smallest route id first).
/// Otherwise every `(origin route, destination route)` pair is intersected
/// and the transfer stop with the fewest combined stops traversed is chosen.
/// Ties fall back to the smallest stop id, then to the smallest route pair.
///
/// The search is a pure function of its inputs.
///
/// # Errors
///
/// Returns [`PlanError::NoRouteFound`] when no pair of routes meets.
pub fn plan_transfer(
    graph: &RouteGraph,
    origin: &StopId,
    destination: &StopId,
) -> Result<TransferCandidate, PlanError> {
    let origin_routes = graph.routes_serving(origin);
    let destination_routes = graph.routes_serving(destination);

    if let Some(route) = origin_routes.intersection(&destination_routes).next() {
        return Ok(TransferCandidate::direct(
            origin.clone(),
            destination.clone(),
            route.clone(),
        ));
    }

    let mut best: Option<(usize, &StopId, &RouteId, &RouteId)> = None;
    for first in &origin_routes {
        for second in &destination_routes {
            for stop in graph.stops_of(first) {
                let (Some(boarding), Some(alighting)) = (
                    graph.distance(first, origin, stop),
                    graph.distance(second, stop, destination),
                ) else {
                    continue;
                };
                let key = (boarding + alighting, stop, first, second);
                if best.is_none_or(|current| key < current) {
                    best = Some(key);
                }
            }
        }
    }

    best.map(|(_, stop, first, second)| {
        TransferCandidate::with_transfer(
            origin.clone(),
            destination.clone(),
            first.clone(),
            stop.clone(),
            second.clone(),
        )
    })
    .ok_or_else(|| PlanError::NoRouteFound {
        origin: origin.clone(),
        destination: destination.clone(),
    })
}
