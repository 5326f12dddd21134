//! Reference route the feed is filtered against

use geo::{Coord, LineString};

use crate::Error;

/// Fixed path of interest, as a polyline of (lon, lat) vertices.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRoute {
    geometry: LineString<f64>,
}

impl ReferenceRoute {
    /// Builds the route from ordered `[lon, lat]` pairs.
    ///
    /// # Errors
    ///
    /// Returns a geometry error if fewer than two points are given or a
    /// coordinate is not finite.
    pub fn new(points: &[[f64; 2]]) -> Result<Self, Error> {
        if points.len() < 2 {
            return Err(Error::GeometryError(format!(
                "reference route needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some([x, y]) = points
            .iter()
            .find(|[x, y]| !x.is_finite() || !y.is_finite())
        {
            return Err(Error::GeometryError(format!(
                "reference route has a non-finite vertex ({x}, {y})"
            )));
        }

        let geometry = points
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect::<LineString<f64>>();
        Ok(Self { geometry })
    }

    pub fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.0.len()
    }
}
