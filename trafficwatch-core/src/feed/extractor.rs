use std::fmt;

use chrono::{DateTime, FixedOffset, Timelike};
use geo::{Coord, LineString, Point};
use log::{debug, warn};

use super::{
    config::ExtractorConfig,
    raw_types::{FeedAlert, FeedCoord, FeedJam, FeedPayload},
};
use crate::{
    Error, Meters, Millis,
    algo::{
        alert_delay, delay::DEFAULT_JAM_SPEED_KMH, distance_to_route, intersects_route, jam_delay,
        polyline_length,
    },
    model::{IncidentRecord, IncidentType, ReferenceRoute},
};

const UNKNOWN_STREET: &str = "unknown";

/// Position of a feed item inside its payload list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemRef {
    Alert(usize),
    Jam(usize),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Alert(idx) => write!(f, "alert #{idx}"),
            ItemRef::Jam(idx) => write!(f, "jam #{idx}"),
        }
    }
}

/// Outcome of extracting one payload.
///
/// Items that could not be processed are listed in `rejected` and do not
/// affect the rest of the payload.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<IncidentRecord>,
    pub rejected: Vec<(ItemRef, Error)>,
}

impl Extraction {
    fn push(&mut self, item: ItemRef, result: Result<Option<IncidentRecord>, Error>) {
        match result {
            Ok(Some(record)) => self.records.push(record),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping {item}: {e}");
                self.rejected.push((item, e));
            }
        }
    }
}

/// Turns feed payloads into incident records relevant to one reference route
#[derive(Debug, Clone)]
pub struct Extractor {
    route: ReferenceRoute,
    corridor_meters: Meters,
    meters_per_degree: f64,
    free_flow_speed_kmh: f64,
    offset: FixedOffset,
}

impl Extractor {
    /// Creates an extractor from the provided configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the route has fewer than two points or a numeric
    /// setting is out of range
    pub fn new(config: &ExtractorConfig) -> Result<Self, Error> {
        let route = ReferenceRoute::new(&config.points)?;
        require_positive("corridor_meters", config.corridor_meters)?;
        require_positive("meters_per_degree", config.meters_per_degree)?;
        require_positive("free_flow_speed_kmh", config.free_flow_speed_kmh)?;

        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::InvalidData(format!(
                    "UTC offset of {} minutes is out of range",
                    config.utc_offset_minutes
                ))
            })?;

        Ok(Self {
            route,
            corridor_meters: config.corridor_meters,
            meters_per_degree: config.meters_per_degree,
            free_flow_speed_kmh: config.free_flow_speed_kmh,
            offset,
        })
    }

    pub fn route(&self) -> &ReferenceRoute {
        &self.route
    }

    /// Distance from `point` to the reference route, in meters
    pub fn distance_to_route(&self, point: &Point<f64>) -> Meters {
        distance_to_route(&self.route, point, self.meters_per_degree)
    }

    /// Decodes an untyped JSON payload and extracts it.
    ///
    /// # Errors
    ///
    /// Returns a parse error if the payload does not have the feed's shape
    pub fn extract_json(&self, payload: serde_json::Value) -> Result<Extraction, Error> {
        let payload: FeedPayload = serde_json::from_value(payload)?;
        Ok(self.extract(&payload))
    }

    /// Extracts route-relevant records from alerts and jams independently.
    pub fn extract(&self, payload: &FeedPayload) -> Extraction {
        let mut extraction = Extraction::default();

        for (idx, alert) in payload.alerts.iter().enumerate() {
            extraction.push(ItemRef::Alert(idx), self.alert_record(alert));
        }
        for (idx, jam) in payload.jams.iter().enumerate() {
            extraction.push(ItemRef::Jam(idx), self.jam_record(jam));
        }

        debug!(
            "Extracted {} records from {} alerts and {} jams ({} rejected)",
            extraction.records.len(),
            payload.alerts.len(),
            payload.jams.len(),
            extraction.rejected.len()
        );
        extraction
    }

    fn alert_record(&self, alert: &FeedAlert) -> Result<Option<IncidentRecord>, Error> {
        let location = alert.location.ok_or(Error::MissingField("location"))?;
        let distance = self.distance_to_route(&Point::new(location.x, location.y));
        if distance >= self.corridor_meters {
            return Ok(None);
        }

        let timestamp = alert.pub_millis.unwrap_or(0);
        let incident_type = alert
            .kind
            .as_deref()
            .map_or(IncidentType::Unknown, IncidentType::from);
        let delay_minutes = alert_delay(&incident_type);

        Ok(Some(IncidentRecord {
            timestamp,
            incident_type,
            street: street_or_unknown(alert.street.as_deref()),
            speed: None,
            distance_to_route: distance,
            delay_minutes,
            hour: self.hour_of(timestamp)?,
        }))
    }

    fn jam_record(&self, jam: &FeedJam) -> Result<Option<IncidentRecord>, Error> {
        let line = jam_line(&jam.segments)?;
        if !intersects_route(&self.route, &line) {
            return Ok(None);
        }

        let speed = jam.speed_kmh.unwrap_or(DEFAULT_JAM_SPEED_KMH);
        let length_km = polyline_length(&line, self.meters_per_degree) / 1000.0;
        let delay_minutes = jam_delay(length_km, speed, self.free_flow_speed_kmh);
        if !delay_minutes.is_finite() {
            return Err(Error::InvalidData(format!(
                "jam delay is not finite for a speed of {speed} km/h"
            )));
        }

        let timestamp = jam.pub_millis.unwrap_or(0);
        Ok(Some(IncidentRecord {
            timestamp,
            incident_type: IncidentType::TrafficJam,
            street: street_or_unknown(jam.street.as_deref()),
            speed: Some(speed),
            distance_to_route: 0.0,
            delay_minutes,
            hour: self.hour_of(timestamp)?,
        }))
    }

    fn hour_of(&self, timestamp: Millis) -> Result<u32, Error> {
        DateTime::from_timestamp_millis(timestamp)
            .map(|utc| utc.with_timezone(&self.offset).hour())
            .ok_or_else(|| Error::InvalidData(format!("timestamp {timestamp} is out of range")))
    }
}

fn jam_line(segments: &[FeedCoord]) -> Result<LineString<f64>, Error> {
    if segments.len() < 2 {
        return Err(Error::GeometryError(format!(
            "jam needs at least 2 segment points, got {}",
            segments.len()
        )));
    }
    Ok(segments
        .iter()
        .map(|p| Coord { x: p.x, y: p.y })
        .collect())
}

fn street_or_unknown(street: Option<&str>) -> String {
    street.unwrap_or(UNKNOWN_STREET).to_string()
}

fn require_positive(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}
