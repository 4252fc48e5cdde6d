mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use pathfinder_lib::{
    Coordinate, Error, GeocodeProvider, GeocodeResolver, MemoryGeocodeCache, Price, RoutePlanner,
    Vehicle,
};
use rust_decimal::Decimal;

use common::{
    station, BrokenRouteStore, FailingDirections, RecordingRouteStore, StraightLineDirections,
    VecStationStore,
};

fn planner(stations: VecStationStore, vehicle: Vehicle) -> RoutePlanner {
    RoutePlanner::new(
        Arc::new(StraightLineDirections::default()),
        Arc::new(stations),
        vehicle,
    )
}

#[test]
fn short_trip_needs_no_stops() {
    let planner = planner(VecStationStore::default(), Vehicle::default());
    let start = Coordinate::new(-97.74, 30.27);
    let end = Coordinate::new(-97.0, 30.5);

    let plan = planner.compute_route(start, end).expect("route computed");

    assert!(plan.fuel_stops.is_empty());
    assert!(plan.total_cost > Decimal::ZERO);
    assert!(plan.gallons > Decimal::ZERO);
    assert_eq!(plan.geometry, vec![start, end]);
    assert!((plan.total_distance_miles - plan.direct_distance_miles).abs() < 1e-9);
}

#[test]
fn short_trip_is_priced_at_the_fallback_without_candidates() {
    let planner = planner(VecStationStore::default(), Vehicle::default());
    let start = Coordinate::new(0.0, 0.0);
    let end = Coordinate::new(1.0, 0.0);

    let plan = planner.compute_route(start, end).unwrap();

    let expected = planner
        .vehicle()
        .leg_cost(start.distance_to(&end), Price::fallback())
        .round_dp(2);
    assert_eq!(plan.total_cost, expected);
}

#[test]
fn long_trip_without_stations_is_infeasible() {
    let vehicle = Vehicle::new(Decimal::TEN, 50.0).unwrap();
    let planner = planner(VecStationStore::default(), vehicle);

    let err = planner
        .compute_route(Coordinate::new(-74.0, 40.7), Coordinate::new(-118.2, 34.0))
        .unwrap_err();

    match &err {
        Error::NoFeasibleRoute {
            direct_miles,
            max_range_miles,
        } => {
            assert!(*direct_miles > 2000.0);
            assert_eq!(*max_range_miles, 50.0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("No feasible route found"));
}

#[test]
fn long_trip_refuels_along_the_way() {
    // Start and end are ~414 miles apart; stations sit every ~138 miles.
    let stations = VecStationStore::new(vec![
        station(1, 2.0, 0.0, "3.100"),
        station(2, 4.0, 0.0, "2.900"),
        // Off the corridor.
        station(3, 3.0, 5.0, "1.000"),
    ]);
    let vehicle = Vehicle::new(Decimal::TEN, 200.0).unwrap();
    let planner = planner(stations, vehicle);

    let plan = planner
        .compute_route(Coordinate::new(0.0, 0.0), Coordinate::new(6.0, 0.0))
        .expect("route computed");

    let names: Vec<&str> = plan.fuel_stops.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Station 1", "Station 2"]);
    assert_eq!(plan.fuel_stops[1].price.to_string(), "2.900");
    assert!(plan.total_distance_miles > 400.0);
    // Baseline is the nearest station's price (3.100) for the first leg.
    let leg = Coordinate::new(0.0, 0.0).distance_to(&Coordinate::new(2.0, 0.0));
    let first_leg = vehicle.leg_cost(leg, "3.100".parse().unwrap());
    assert!(plan.total_cost > first_leg.round_dp(2));
}

#[test]
fn picks_the_cheaper_of_two_feasible_stops() {
    // Either station alone bridges the trip; the cheaper one should win.
    let stations = VecStationStore::new(vec![
        station(1, 2.0, 0.0, "4.000"),
        station(2, 2.0, 0.05, "2.000"),
    ]);
    let vehicle = Vehicle::new(Decimal::TEN, 150.0).unwrap();
    let planner = planner(stations, vehicle);

    let plan = planner
        .compute_route(Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 0.0))
        .unwrap();

    assert_eq!(plan.fuel_stops.len(), 1);
    assert_eq!(plan.fuel_stops[0].name, "Station 2");
}

#[test]
fn directions_errors_propagate() {
    let planner = RoutePlanner::new(
        Arc::new(FailingDirections),
        Arc::new(VecStationStore::default()),
        Vehicle::default(),
    );
    let err = planner
        .compute_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.1, 0.0))
        .unwrap_err();
    assert!(matches!(err, Error::Provider { .. }));
}

#[test]
fn attached_route_store_receives_the_plan() {
    let store = Arc::new(RecordingRouteStore::default());
    let planner =
        planner(VecStationStore::default(), Vehicle::default()).with_route_store(store.clone());
    let start = Coordinate::new(0.0, 0.0);
    let end = Coordinate::new(0.5, 0.0);

    let plan = planner.compute_route(start, end).unwrap();

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, start);
    assert_eq!(saved[0].1, end);
    assert_eq!(saved[0].2, plan);
}

#[test]
fn route_store_failures_do_not_fail_the_request() {
    let planner = planner(VecStationStore::default(), Vehicle::default())
        .with_route_store(Arc::new(BrokenRouteStore));
    assert!(planner
        .compute_route(Coordinate::new(0.0, 0.0), Coordinate::new(0.5, 0.0))
        .is_ok());
}

struct FixedGeocoder;

impl GeocodeProvider for FixedGeocoder {
    fn name(&self) -> &str {
        "fixed"
    }

    fn geocode(&self, address: &str) -> Option<Coordinate> {
        match address {
            "Austin, TX" => Some(Coordinate::new(-97.74, 30.27)),
            "Round Rock, TX" => Some(Coordinate::new(-97.68, 30.51)),
            _ => None,
        }
    }
}

#[test]
fn addresses_are_geocoded_before_routing() {
    let directions = Arc::new(StraightLineDirections::default());
    let planner = RoutePlanner::new(
        directions.clone(),
        Arc::new(VecStationStore::default()),
        Vehicle::default(),
    );
    let resolver = GeocodeResolver::new(
        vec![Box::new(FixedGeocoder)],
        Arc::new(MemoryGeocodeCache::new()),
    );

    let plan = planner
        .compute_route_between_addresses(&resolver, "Austin, TX", "Round Rock, TX")
        .unwrap();
    assert_eq!(plan.geometry.len(), 2);
    assert_eq!(directions.calls.load(Ordering::SeqCst), 1);

    let err = planner
        .compute_route_between_addresses(&resolver, "Austin, TX", "Atlantis")
        .unwrap_err();
    match err {
        Error::AddressNotFound { address } => assert_eq!(address, "Atlantis"),
        other => panic!("unexpected error: {other:?}"),
    }
    // The failed lookup never reached the directions provider.
    assert_eq!(directions.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn plan_nodes_never_include_virtual_endpoints() {
    let stations = VecStationStore::new(vec![station(5, 2.0, 0.0, "3.000")]);
    let planner = planner(stations, Vehicle::new(Decimal::TEN, 150.0).unwrap());
    let plan = planner
        .compute_route(Coordinate::new(0.0, 0.0), Coordinate::new(4.0, 0.0))
        .unwrap();
    let names: Vec<&str> = plan.fuel_stops.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Station 5"]);
}
