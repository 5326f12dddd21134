//! Delay estimates for alerts and jams

use crate::{Minutes, model::IncidentType};

/// Assumed uncongested speed
pub const FREE_FLOW_SPEED_KMH: f64 = 50.0;
/// Jam speed used when the feed omits `speedKMH`
pub const DEFAULT_JAM_SPEED_KMH: f64 = 5.0;
/// Alert delay for types without a table entry
pub const DEFAULT_ALERT_DELAY: Minutes = 5.0;

/// Constant delay associated with an alert type
pub fn alert_delay(incident_type: &IncidentType) -> Minutes {
    match incident_type {
        IncidentType::Accident => 10.0,
        IncidentType::Hazard => 5.0,
        IncidentType::Jam => 15.0,
        IncidentType::Police => 2.0,
        IncidentType::RoadClosed => 20.0,
        _ => DEFAULT_ALERT_DELAY,
    }
}

/// Extra minutes needed to cross a jam compared to free flow.
///
/// Not clamped: a jam faster than `free_flow_kmh` yields a negative delay,
/// and a zero speed yields infinity.
pub fn jam_delay(length_km: f64, jam_speed_kmh: f64, free_flow_kmh: f64) -> Minutes {
    length_km * (1.0 / jam_speed_kmh - 1.0 / free_flow_kmh) * 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_table() {
        assert_eq!(alert_delay(&IncidentType::Accident), 10.0);
        assert_eq!(alert_delay(&IncidentType::Hazard), 5.0);
        assert_eq!(alert_delay(&IncidentType::Jam), 15.0);
        assert_eq!(alert_delay(&IncidentType::Police), 2.0);
        assert_eq!(alert_delay(&IncidentType::RoadClosed), 20.0);
        assert_eq!(alert_delay(&IncidentType::Unknown), DEFAULT_ALERT_DELAY);
        assert_eq!(
            alert_delay(&IncidentType::Other("CONSTRUCTION".into())),
            DEFAULT_ALERT_DELAY
        );
    }

    #[test]
    fn one_km_at_ten_kmh() {
        let delay = jam_delay(1.0, 10.0, FREE_FLOW_SPEED_KMH);
        assert!((delay - 4.8).abs() < 1e-9, "{delay}");
    }

    #[test]
    fn faster_than_free_flow_is_negative() {
        let delay = jam_delay(2.0, 100.0, FREE_FLOW_SPEED_KMH);
        assert!((delay - (-1.2)).abs() < 1e-9, "{delay}");
    }

    #[test]
    fn free_flow_speed_means_no_delay() {
        assert_eq!(jam_delay(3.0, 50.0, 50.0), 0.0);
    }
}
