//! Output formatting for plans, stations and route history.
//!
//! Every renderer writes to a caller-supplied `Write` so the binary can
//! target stdout while tests capture into a buffer.

use std::io::{self, Write};

use clap::ValueEnum;
use pathfinder_lib::{Coordinate, NodeId, RoutePlan, StationNode, StoredRoute};
use serde::Serialize;

use crate::terminal::{format_with_separators, ColorPalette};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Serialize)]
struct RouteReport<'a> {
    start: Coordinate,
    end: Coordinate,
    #[serde(flatten)]
    plan: &'a RoutePlan,
}

#[derive(Serialize)]
struct StationRow<'a> {
    id: Option<i64>,
    name: &'a str,
    lon: f64,
    lat: f64,
    price: String,
}

#[derive(Serialize)]
struct HistoryRow {
    id: i64,
    start: Coordinate,
    end: Coordinate,
    fuel_stops: usize,
    total_cost: String,
    created_at: String,
}

#[derive(Serialize)]
struct GeocodeRow<'a> {
    address: &'a str,
    lon: f64,
    lat: f64,
}

/// Render a computed plan.
pub fn write_route<W: Write>(
    out: &mut W,
    format: OutputFormat,
    palette: &ColorPalette,
    start: Coordinate,
    end: Coordinate,
    plan: &RoutePlan,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, &RouteReport { start, end, plan });
    }

    let p = palette;
    let stops = plan.fuel_stops.len();
    writeln!(
        out,
        "Route plan: {stops} fuel stop{plural}, {distance} mi (direct {direct} mi)",
        plural = if stops == 1 { "" } else { "s" },
        distance = miles(plan.total_distance_miles),
        direct = miles(plan.direct_distance_miles),
    )?;
    writeln!(out, " {}STRT{} {}{start}{}", p.tag_start, p.reset, p.cyan, p.reset)?;
    for stop in &plan.fuel_stops {
        writeln!(
            out,
            " {}FUEL{} {}{}{} {}{}/gal{} {}({},{}){}",
            p.tag_fuel,
            p.reset,
            p.white_bold,
            stop.name,
            p.reset,
            p.green,
            stop.price,
            p.reset,
            p.gray,
            stop.lon,
            stop.lat,
            p.reset,
        )?;
    }
    writeln!(out, " {}GOAL{} {}{end}{}", p.tag_goal, p.reset, p.cyan, p.reset)?;
    writeln!(out)?;
    writeln!(out, "Fuel: {} gal", plan.gallons)?;
    writeln!(
        out,
        "Total cost: {}${}{}",
        p.white_bold, plan.total_cost, p.reset
    )
}

/// Render a geocoded address.
pub fn write_geocode<W: Write>(
    out: &mut W,
    format: OutputFormat,
    address: &str,
    coordinate: Coordinate,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &GeocodeRow {
                address,
                lon: coordinate.lon,
                lat: coordinate.lat,
            },
        ),
        OutputFormat::Text => writeln!(out, "{address}: {coordinate}"),
    }
}

/// Render corridor stations.
pub fn write_stations<W: Write>(
    out: &mut W,
    format: OutputFormat,
    palette: &ColorPalette,
    stations: &[StationNode],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        let rows: Vec<StationRow<'_>> = stations
            .iter()
            .map(|station| StationRow {
                id: match station.id {
                    NodeId::Station(id) => Some(id),
                    NodeId::Start | NodeId::End => None,
                },
                name: &station.name,
                lon: station.coordinate.lon,
                lat: station.coordinate.lat,
                price: station.price.to_string(),
            })
            .collect();
        return write_json(out, &rows);
    }

    let p = palette;
    writeln!(out, "{} station(s) in corridor:", stations.len())?;
    for station in stations {
        writeln!(
            out,
            " - {}{}{} {}{}/gal{} {}({}){}",
            p.white_bold,
            station.name,
            p.reset,
            p.green,
            station.price,
            p.reset,
            p.gray,
            station.coordinate,
            p.reset,
        )?;
    }
    Ok(())
}

/// Render saved routes, newest first.
pub fn write_history<W: Write>(
    out: &mut W,
    format: OutputFormat,
    routes: &[StoredRoute],
) -> io::Result<()> {
    if format == OutputFormat::Json {
        let rows: Vec<HistoryRow> = routes
            .iter()
            .map(|route| HistoryRow {
                id: route.id,
                start: route.start,
                end: route.end,
                fuel_stops: route.plan.fuel_stops.len(),
                total_cost: route.plan.total_cost.to_string(),
                created_at: route.created_at.to_rfc3339(),
            })
            .collect();
        return write_json(out, &rows);
    }

    if routes.is_empty() {
        return writeln!(out, "No saved routes.");
    }
    for route in routes {
        writeln!(
            out,
            "#{} {} -> {}: {} stop(s), ${} ({})",
            route.id,
            route.start,
            route.end,
            route.plan.fuel_stops.len(),
            route.plan.total_cost,
            route.created_at.format("%Y-%m-%d %H:%M UTC"),
        )?;
    }
    Ok(())
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn miles(value: f64) -> String {
    format_with_separators(value.max(0.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_plan;

    fn render(format: OutputFormat) -> String {
        let plan = sample_plan();
        let mut buffer = Vec::new();
        write_route(
            &mut buffer,
            format,
            &ColorPalette::plain(),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(6.0, 0.0),
            &plan,
        )
        .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn text_lists_stops_between_endpoints() {
        let text = render(OutputFormat::Text);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Route plan: 1 fuel stop, 415 mi (direct 415 mi)");
        assert_eq!(lines[1], " STRT 0,0");
        assert_eq!(lines[2], " FUEL Halfway 2.899/gal (3,0)");
        assert_eq!(lines[3], " GOAL 6,0");
        assert!(text.contains("Fuel: 41.46 gal"));
        assert!(text.contains("Total cost: $120.19"));
    }

    #[test]
    fn json_flattens_plan_next_to_endpoints() {
        let json: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(json["start"]["lon"], 0.0);
        assert_eq!(json["total_cost"], "120.19");
        assert_eq!(json["fuel_stops"][0]["price"], "2.899");
        assert_eq!(json["geometry"][1], serde_json::json!([6.0, 0.0]));
    }

    #[test]
    fn geocode_text_uses_lon_lat_order() {
        let mut buffer = Vec::new();
        write_geocode(
            &mut buffer,
            OutputFormat::Text,
            "Austin, TX",
            Coordinate::new(-97.74, 30.27),
        )
        .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "Austin, TX: -97.74,30.27\n");
    }

    #[test]
    fn empty_history_says_so() {
        let mut buffer = Vec::new();
        write_history(&mut buffer, OutputFormat::Text, &[]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "No saved routes.\n");
    }
}
