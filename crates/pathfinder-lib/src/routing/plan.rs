use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::graph::StationNode;
use crate::price::Price;
use crate::vehicle::{miles_to_decimal, Vehicle};

/// Decimal places kept on reported cost and fuel totals.
pub const TOTALS_SCALE: u32 = 2;

/// A refuelling stop on a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelStop {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub price: Price,
}

impl From<&StationNode> for FuelStop {
    fn from(node: &StationNode) -> Self {
        Self {
            name: node.name.clone(),
            lon: node.coordinate.lon,
            lat: node.coordinate.lat,
            price: node.price,
        }
    }
}

/// Result of a route computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Driving geometry from the directions provider, serialised as
    /// `[[lon, lat], ...]`.
    #[serde(with = "coordinate_pairs")]
    pub geometry: Vec<Coordinate>,
    /// Stops in travel order; the virtual endpoints are never listed.
    pub fuel_stops: Vec<FuelStop>,
    pub total_cost: Decimal,
    pub gallons: Decimal,
    /// Sum of great-circle leg distances between consecutive plan nodes.
    pub total_distance_miles: f64,
    pub direct_distance_miles: f64,
}

impl RoutePlan {
    /// Assemble a plan from the chosen node sequence.
    ///
    /// Each leg costs `(distance / mpg) * price(departure)`, the same formula
    /// used for graph edges, so a bypassed trip is priced like any other leg.
    pub(crate) fn from_nodes(
        geometry: Vec<Coordinate>,
        nodes: &[&StationNode],
        vehicle: &Vehicle,
        direct_distance_miles: f64,
    ) -> Self {
        let mut total_cost = Decimal::ZERO;
        let mut total_distance = 0.0;
        for leg in nodes.windows(2) {
            let distance = leg[0].coordinate.distance_to(&leg[1].coordinate);
            total_cost += vehicle.leg_cost(distance, leg[0].price);
            total_distance += distance;
        }
        let gallons = miles_to_decimal(total_distance) / vehicle.mpg;

        Self {
            geometry,
            fuel_stops: nodes
                .iter()
                .filter(|node| !node.id.is_virtual())
                .map(|node| FuelStop::from(*node))
                .collect(),
            total_cost: round_total(total_cost),
            gallons: round_total(gallons),
            total_distance_miles: total_distance,
            direct_distance_miles,
        }
    }
}

fn round_total(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(TOTALS_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(TOTALS_SCALE);
    rounded
}

mod coordinate_pairs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::geo::Coordinate;

    pub fn serialize<S: Serializer>(path: &[Coordinate], serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = path.iter().map(|c| c.to_pair()).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Coordinate>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(Coordinate::from).collect())
    }
}
