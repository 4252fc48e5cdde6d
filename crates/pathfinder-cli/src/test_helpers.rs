// Test utilities used across `pathfinder-cli` unit tests.
// Kept under `#[cfg(test)]` so it is not part of the public crate API.
use pathfinder_lib::{Coordinate, FuelStop, RoutePlan};

/// A one-stop plan across six degrees of longitude at the equator.
pub fn sample_plan() -> RoutePlan {
    RoutePlan {
        geometry: vec![Coordinate::new(0.0, 0.0), Coordinate::new(6.0, 0.0)],
        fuel_stops: vec![FuelStop {
            name: "Halfway".to_string(),
            lon: 3.0,
            lat: 0.0,
            price: "2.899".parse().expect("valid price"),
        }],
        total_cost: "120.19".parse().expect("valid decimal"),
        gallons: "41.46".parse().expect("valid decimal"),
        total_distance_miles: 414.6,
        direct_distance_miles: 414.6,
    }
}
