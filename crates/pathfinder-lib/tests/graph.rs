mod common;

use pathfinder_lib::{build_graph, Coordinate, NodeId, StationNode, Vehicle};
use rust_decimal::Decimal;

use common::{node, price};

#[test]
fn nearby_stations_connect_and_remote_station_stays_isolated() {
    let nodes = vec![
        node(1, 0.0, 0.0, "3.000"),
        node(2, 0.1, 0.0, "3.500"),
        node(3, 50.0, 50.0, "2.000"),
    ];
    let graph = build_graph(&nodes, &Vehicle::default());

    assert!(graph.edge_cost(NodeId::Station(1), NodeId::Station(2)).is_some());
    assert!(graph.edge_cost(NodeId::Station(2), NodeId::Station(1)).is_some());
    assert!(graph.edge_cost(NodeId::Station(1), NodeId::Station(3)).is_none());
    assert!(graph.edge_cost(NodeId::Station(3), NodeId::Station(2)).is_none());

    // Isolated nodes are still present with no outgoing edges.
    assert!(graph.contains(NodeId::Station(3)));
    assert_eq!(graph.neighbours(NodeId::Station(3)).count(), 0);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn edge_cost_is_gallons_at_departure_price() {
    let nodes = vec![node(1, 0.0, 0.0, "3.000"), node(2, 0.1, 0.0, "4.000")];
    let vehicle = Vehicle::default();
    let graph = build_graph(&nodes, &vehicle);

    let distance = nodes[0].coordinate.distance_to(&nodes[1].coordinate);
    let forward = graph
        .edge_cost(NodeId::Station(1), NodeId::Station(2))
        .unwrap();
    let backward = graph
        .edge_cost(NodeId::Station(2), NodeId::Station(1))
        .unwrap();

    assert_eq!(forward, vehicle.leg_cost(distance, price("3.000")));
    assert_eq!(backward, vehicle.leg_cost(distance, price("4.000")));
    assert!(backward > forward);
}

#[test]
fn edges_respect_vehicle_range() {
    // Roughly 69 miles apart.
    let nodes = vec![node(1, 0.0, 0.0, "3.000"), node(2, 1.0, 0.0, "3.000")];

    let short_range = Vehicle::new(Decimal::TEN, 50.0).unwrap();
    assert_eq!(build_graph(&nodes, &short_range).edge_count(), 0);

    let long_range = Vehicle::new(Decimal::TEN, 70.0).unwrap();
    assert_eq!(build_graph(&nodes, &long_range).edge_count(), 2);
}

#[test]
fn virtual_endpoints_join_the_graph() {
    let start = StationNode::virtual_node(NodeId::Start, Coordinate::new(0.0, 0.0), price("3.500"));
    let end = StationNode::virtual_node(NodeId::End, Coordinate::new(0.2, 0.0), price("3.500"));
    let nodes = vec![start, end, node(7, 0.1, 0.0, "2.900")];
    let graph = build_graph(&nodes, &Vehicle::default());

    let from_start: Vec<NodeId> = graph.neighbours(NodeId::Start).map(|(id, _)| id).collect();
    assert_eq!(from_start, vec![NodeId::End, NodeId::Station(7)]);
}
