use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Meters, Millis, Minutes};

/// Column order of a processed batch file
pub const RECORD_HEADERS: [&str; 7] = [
    "timestamp",
    "incident_type",
    "street",
    "speed",
    "distance_to_route",
    "delay_minutes",
    "hour",
];

/// Incident category as reported by the feed.
///
/// Types outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentType {
    Accident,
    Hazard,
    Jam,
    Police,
    RoadClosed,
    TrafficJam,
    Unknown,
    Other(String),
}

impl IncidentType {
    pub fn as_str(&self) -> &str {
        match self {
            IncidentType::Accident => "ACCIDENT",
            IncidentType::Hazard => "HAZARD",
            IncidentType::Jam => "JAM",
            IncidentType::Police => "POLICE",
            IncidentType::RoadClosed => "ROAD_CLOSED",
            IncidentType::TrafficJam => "TRAFFIC_JAM",
            IncidentType::Unknown => "UNKNOWN",
            IncidentType::Other(raw) => raw,
        }
    }
}

impl From<&str> for IncidentType {
    fn from(raw: &str) -> Self {
        match raw {
            "ACCIDENT" => IncidentType::Accident,
            "HAZARD" => IncidentType::Hazard,
            "JAM" => IncidentType::Jam,
            "POLICE" => IncidentType::Police,
            "ROAD_CLOSED" => IncidentType::RoadClosed,
            "TRAFFIC_JAM" => IncidentType::TrafficJam,
            "UNKNOWN" => IncidentType::Unknown,
            other => IncidentType::Other(other.to_string()),
        }
    }
}

impl From<String> for IncidentType {
    fn from(raw: String) -> Self {
        match IncidentType::from(raw.as_str()) {
            IncidentType::Other(_) => IncidentType::Other(raw),
            known => known,
        }
    }
}

impl From<IncidentType> for String {
    fn from(kind: IncidentType) -> Self {
        match kind {
            IncidentType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One route-relevant alert or jam, as persisted in a processed batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Publication time reported by the feed
    pub timestamp: Millis,
    pub incident_type: IncidentType,
    pub street: String,
    /// Reported speed in km/h, jams only
    pub speed: Option<f64>,
    /// Zero for jams crossing the route
    pub distance_to_route: Meters,
    pub delay_minutes: Minutes,
    /// Hour of day of `timestamp`, 0..=23
    pub hour: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_round_trip_through_strings() {
        for raw in [
            "ACCIDENT",
            "HAZARD",
            "JAM",
            "POLICE",
            "ROAD_CLOSED",
            "TRAFFIC_JAM",
            "UNKNOWN",
        ] {
            let kind = IncidentType::from(raw);
            assert!(!matches!(kind, IncidentType::Other(_)), "{raw}");
            assert_eq!(String::from(kind), raw);
        }
    }

    #[test]
    fn unrecognized_type_is_kept_verbatim() {
        let kind = IncidentType::from("WEATHERHAZARD".to_string());
        assert_eq!(kind, IncidentType::Other("WEATHERHAZARD".to_string()));
        assert_eq!(kind.to_string(), "WEATHERHAZARD");
    }

    #[test]
    fn record_serializes_type_as_plain_string() {
        let record = IncidentRecord {
            timestamp: 1_700_000_000_000,
            incident_type: IncidentType::RoadClosed,
            street: "Av. Constituyentes".to_string(),
            speed: None,
            distance_to_route: 12.5,
            delay_minutes: 20.0,
            hour: 22,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["incident_type"], "ROAD_CLOSED");
        assert!(json["speed"].is_null());
    }
}
