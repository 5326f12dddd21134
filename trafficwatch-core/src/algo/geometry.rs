//! Planar relations between feed geometries and the reference route.
//!
//! Longitude and latitude are used directly as planar coordinates. Degrees
//! are turned into meters with a single fixed multiplier, which is only a
//! rough approximation away from the equator but is what the corridor
//! threshold is calibrated against.

use geo::{Distance, Euclidean, Intersects, Length, LineString, Point};

use crate::{Meters, model::ReferenceRoute};

/// Degree to meter multiplier
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Minimum planar distance from `point` to the route, in meters
pub fn distance_to_route(
    route: &ReferenceRoute,
    point: &Point<f64>,
    meters_per_degree: f64,
) -> Meters {
    Euclidean.distance(point, route.geometry()) * meters_per_degree
}

/// Whether `line` shares at least one point with the route
pub fn intersects_route(route: &ReferenceRoute, line: &LineString<f64>) -> bool {
    route.geometry().intersects(line)
}

/// Planar length of `line`, in meters
pub fn polyline_length(line: &LineString<f64>, meters_per_degree: f64) -> Meters {
    Euclidean.length(line) * meters_per_degree
}
