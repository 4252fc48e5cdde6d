//! Geographic primitives: WGS84 coordinates and great-circle distances.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius used by every distance computation, in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Conversion factor between miles and the metres expected by spatial stores.
pub const METERS_PER_MILE: f64 = 1609.34;

/// A WGS84 position stored as `(longitude, latitude)` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lon: f64, lat: f64) -> Result<Self> {
        let input = format!("{lon},{lat}");
        if !lon.is_finite() || !lat.is_finite() {
            return Err(Error::InvalidCoordinate {
                input,
                message: "longitude and latitude must be finite".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidCoordinate {
                input,
                message: "longitude must be between -180 and 180".to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinate {
                input,
                message: "latitude must be between -90 and 90".to_string(),
            });
        }
        Ok(Self { lon, lat })
    }

    /// Great-circle distance to `other` in miles.
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_miles(*self, *other)
    }

    /// Pair form used by provider payloads (`[lon, lat]`).
    pub fn to_pair(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// Parses the `"lon,lat"` text form.
impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidCoordinate {
            input: s.to_string(),
            message: message.to_string(),
        };

        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| invalid("expected 'lon,lat'"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| invalid("longitude is not a number"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| invalid("latitude is not a number"))?;

        Coordinate::checked(lon, lat).map_err(|err| match err {
            Error::InvalidCoordinate { message, .. } => invalid(&message),
            other => other,
        })
    }
}

/// Haversine great-circle distance between two coordinates, in miles.
///
/// `d = 2·R·atan2(√h, √(1−h))` with
/// `h = sin²(Δlat/2) + cos(lat₁)·cos(lat₂)·sin²(Δlon/2)`.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    let d_lon = (b.lon - a.lon).to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Shortest distance in miles from `point` to the polyline `path`.
///
/// Each segment is projected onto a local equirectangular plane centred on
/// `point`, which is accurate well beyond corridor widths of a few dozen
/// miles. Returns `f64::INFINITY` for an empty path.
pub fn distance_to_path_miles(point: Coordinate, path: &[Coordinate]) -> f64 {
    match path {
        [] => f64::INFINITY,
        [only] => haversine_miles(point, *only),
        _ => path
            .windows(2)
            .map(|pair| distance_to_segment_miles(point, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

fn distance_to_segment_miles(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let scale_x = point.lat.to_radians().cos() * EARTH_RADIUS_MILES;
    let project = |c: Coordinate| {
        (
            (c.lon - point.lon).to_radians() * scale_x,
            (c.lat - point.lat).to_radians() * EARTH_RADIUS_MILES,
        )
    };
    let (ax, ay) = project(a);
    let (bx, by) = project(b);
    let (dx, dy) = (bx - ax, by - ay);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (-(ax * dx + ay * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    (cx * cx + cy * cy).sqrt()
}

/// Axis-aligned bounding box of `path`, expanded by `margin_miles`.
///
/// Returned as `(min_lon, min_lat, max_lon, max_lat)`.
pub fn expanded_bounds(path: &[Coordinate], margin_miles: f64) -> Option<(f64, f64, f64, f64)> {
    let first = path.first()?;
    let (mut min_lon, mut min_lat, mut max_lon, mut max_lat) =
        (first.lon, first.lat, first.lon, first.lat);
    for c in path {
        min_lon = min_lon.min(c.lon);
        max_lon = max_lon.max(c.lon);
        min_lat = min_lat.min(c.lat);
        max_lat = max_lat.max(c.lat);
    }

    let lat_margin = (margin_miles / EARTH_RADIUS_MILES).to_degrees();
    let widest = min_lat.abs().max(max_lat.abs()).min(89.0);
    let lon_margin = lat_margin / widest.to_radians().cos();

    Some((
        (min_lon - lon_margin).max(-180.0),
        (min_lat - lat_margin).max(-90.0),
        (max_lon + lon_margin).min(180.0),
        (max_lat + lat_margin).min(90.0),
    ))
}
