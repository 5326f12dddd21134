use serde::Deserialize;

use crate::algo::{delay::FREE_FLOW_SPEED_KMH, geometry::METERS_PER_DEGREE};

/// Polanco to Santa Fe, Mexico City, as `[lon, lat]`
pub const DEFAULT_ROUTE: [[f64; 2]; 3] = [
    [-99.1947, 19.4336],
    [-99.2034, 19.4285],
    [-99.2256, 19.3698],
];

/// Settings the extractor is built from
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Reference route vertices as `[lon, lat]`
    pub points: Vec<[f64; 2]>,
    /// Alerts at or beyond this distance from the route are dropped
    pub corridor_meters: f64,
    pub meters_per_degree: f64,
    pub free_flow_speed_kmh: f64,
    /// Offset applied to timestamps before taking the hour of day
    pub utc_offset_minutes: i32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_ROUTE.to_vec(),
            corridor_meters: 500.0,
            meters_per_degree: METERS_PER_DEGREE,
            free_flow_speed_kmh: FREE_FLOW_SPEED_KMH,
            utc_offset_minutes: 0,
        }
    }
}
