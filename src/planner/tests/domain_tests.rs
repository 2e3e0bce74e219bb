//! Unit tests for the route graph and the one-transfer search.

use crate::planner::domain::{
    PlanError, PlannerDomainError, RouteGraph, RouteId, StopId, TransferCandidate, plan_transfer,
};
use once_cell::sync::Lazy;
use rstest::rstest;

fn stop(raw: &str) -> StopId {
    StopId::new(raw).expect("valid stop id")
}

fn route(raw: &str) -> RouteId {
    RouteId::new(raw).expect("valid route id")
}

fn graph(routes: &[(&str, &[&str])]) -> RouteGraph {
    RouteGraph::from_routes(
        routes
            .iter()
            .map(|(id, stops)| (route(id), stops.iter().map(|raw| stop(raw)).collect())),
    )
}

static DOWNTOWN: Lazy<RouteGraph> = Lazy::new(|| {
    graph(&[
        ("Red", &["alewife", "harvard", "park", "dtx", "south"]),
        ("Orange", &["oak-grove", "haymarket", "state", "dtx", "back-bay"]),
        ("Green-B", &["boston-college", "kenmore", "park", "government", "haymarket"]),
        ("Blue", &["wonderland", "airport", "state", "government", "bowdoin"]),
    ])
});

#[test]
fn direct_route_is_found_when_both_stops_share_a_route() {
    let network = graph(&[("Red", &["A", "B", "C"]), ("Green", &["B", "D"])]);

    let result = plan_transfer(&network, &stop("A"), &stop("C")).expect("direct route");

    assert_eq!(result, TransferCandidate::direct(stop("A"), stop("C"), route("Red")));
    assert_eq!(result.hops(), 0);
}

#[test]
fn single_transfer_is_found_at_the_common_stop() {
    let network = graph(&[("Red", &["A", "B"]), ("Green", &["B", "D"])]);

    let result = plan_transfer(&network, &stop("A"), &stop("D")).expect("transfer route");

    assert_eq!(
        result,
        TransferCandidate::with_transfer(stop("A"), stop("D"), route("Red"), stop("B"), route("Green"))
    );
    assert_eq!(result.hops(), 1);
}

#[test]
fn disjoint_routes_yield_no_route_found() {
    let network = graph(&[("Red", &["A", "B"]), ("Green", &["C", "D"])]);

    let result = plan_transfer(&network, &stop("A"), &stop("D"));

    assert_eq!(
        result,
        Err(PlanError::NoRouteFound {
            origin: stop("A"),
            destination: stop("D"),
        })
    );
}

#[test]
fn unknown_stops_yield_no_route_found() {
    let result = plan_transfer(&DOWNTOWN, &stop("nowhere"), &stop("harvard"));
    assert!(matches!(result, Err(PlanError::NoRouteFound { .. })));
}

#[test]
fn smallest_route_id_wins_among_direct_routes() {
    let network = graph(&[("Red", &["A", "B"]), ("Mattapan", &["A", "B"])]);

    let result = plan_transfer(&network, &stop("A"), &stop("B")).expect("direct route");

    assert_eq!(result.first_route(), &route("Mattapan"));
}

#[test]
fn transfer_stop_is_where_the_routes_meet() {
    let result = plan_transfer(&DOWNTOWN, &stop("harvard"), &stop("bowdoin"));
    assert!(result.is_err(), "bowdoin is only on Blue, which never meets Red");

    let to_kenmore =
        plan_transfer(&DOWNTOWN, &stop("alewife"), &stop("kenmore")).expect("transfer");
    assert_eq!(to_kenmore.transfer_stop(), Some(&stop("park")));
    assert_eq!(to_kenmore.second_route(), Some(&route("Green-B")));
}

#[test]
fn transfer_minimises_combined_stops() {
    // Z costs 1 + 2 stops, M costs 3 + 1.
    let network = graph(&[("R", &["O", "Z", "m1", "M"]), ("G", &["M", "D", "n1", "Z"])]);

    let result = plan_transfer(&network, &stop("O"), &stop("D")).expect("transfer");

    assert_eq!(result.transfer_stop(), Some(&stop("Z")));
}

#[test]
fn equal_cost_transfers_fall_back_to_smallest_stop_id() {
    // Both X and Y are one stop away on each leg.
    let network = graph(&[("R1", &["Y", "O", "X"]), ("R2", &["Y", "D", "X"])]);

    let result = plan_transfer(&network, &stop("O"), &stop("D")).expect("transfer");

    assert_eq!(result.transfer_stop(), Some(&stop("X")));
}

#[test]
fn equal_cost_transfers_on_the_same_stop_fall_back_to_route_pair() {
    let network = graph(&[
        ("R2", &["O", "T"]),
        ("R1", &["O", "T"]),
        ("S1", &["T", "D"]),
    ]);

    let result = plan_transfer(&network, &stop("O"), &stop("D")).expect("transfer");

    assert_eq!(result.first_route(), &route("R1"));
    assert_eq!(result.transfer_stop(), Some(&stop("T")));
}

#[test]
fn routes_are_traversable_in_both_directions() {
    let network = graph(&[("Red", &["T", "A"]), ("Green", &["D", "T"])]);

    let result = plan_transfer(&network, &stop("A"), &stop("D")).expect("transfer");

    assert_eq!(result.transfer_stop(), Some(&stop("T")));
}

#[test]
fn loop_routes_use_the_shortest_distance() {
    let network = graph(&[("Loop", &["A", "B", "C", "D", "A"])]);

    assert_eq!(network.distance(&route("Loop"), &stop("A"), &stop("D")), Some(1));
    assert_eq!(network.distance(&route("Loop"), &stop("A"), &stop("Z")), None);
}

#[rstest]
#[case("harvard", "kenmore")]
#[case("alewife", "back-bay")]
#[case("wonderland", "harvard")]
#[case("A", "B")]
fn search_is_idempotent(#[case] origin: &str, #[case] destination: &str) {
    let first = plan_transfer(&DOWNTOWN, &stop(origin), &stop(destination));
    let second = plan_transfer(&DOWNTOWN, &stop(origin), &stop(destination));
    assert_eq!(first, second);
}

#[test]
fn hop_count_never_exceeds_one() {
    let stops = ["alewife", "harvard", "kenmore", "state", "airport", "back-bay"];
    for origin in stops {
        for destination in stops {
            if let Ok(candidate) = plan_transfer(&DOWNTOWN, &stop(origin), &stop(destination)) {
                assert!(candidate.hops() <= 1);
            }
        }
    }
}

#[rstest]
#[case("", PlannerDomainError::EmptyStopId)]
#[case("   ", PlannerDomainError::EmptyStopId)]
fn blank_stop_ids_are_rejected(#[case] raw: &str, #[case] expected: PlannerDomainError) {
    assert_eq!(StopId::new(raw), Err(expected));
}

#[test]
fn ids_keep_their_case() {
    assert_eq!(route(" Green-B ").as_str(), "Green-B");
    assert!(route("Blue") < route("Green-B"));
}
