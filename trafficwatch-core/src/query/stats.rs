use std::collections::BTreeMap;

use serde::Serialize;

use super::{DateRange, query};
use crate::{Error, Minutes, model::IncidentRecord, storage::BatchStore};

/// Summary of the incidents in a set of batches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficStats {
    /// Hour of day with the highest mean delay
    pub worst_time: Option<u32>,
    /// Hour of day with the lowest mean delay
    pub best_time: Option<u32>,
    /// Number of records per incident type
    pub common_incidents: BTreeMap<String, usize>,
}

/// Aggregates records by hour of day and by incident type.
///
/// Ties on the mean delay go to the earliest hour. Both hours are `None`
/// when there are no records.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(records: &[IncidentRecord]) -> TrafficStats {
    let mut by_hour: BTreeMap<u32, (Minutes, usize)> = BTreeMap::new();
    let mut common_incidents: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        let (total, count) = by_hour.entry(record.hour).or_insert((0.0, 0));
        *total += record.delay_minutes;
        *count += 1;
        *common_incidents
            .entry(record.incident_type.to_string())
            .or_default() += 1;
    }

    let mut worst: Option<(u32, Minutes)> = None;
    let mut best: Option<(u32, Minutes)> = None;
    for (hour, (total, count)) in by_hour {
        let mean = total / count as f64;
        if worst.is_none_or(|(_, m)| mean > m) {
            worst = Some((hour, mean));
        }
        if best.is_none_or(|(_, m)| mean < m) {
            best = Some((hour, mean));
        }
    }

    TrafficStats {
        worst_time: worst.map(|(hour, _)| hour),
        best_time: best.map(|(hour, _)| hour),
        common_incidents,
    }
}

/// Queries `range` and aggregates the result
///
/// # Errors
///
/// Same as [`query`]
pub fn traffic_stats(store: &BatchStore, range: &DateRange) -> Result<TrafficStats, Error> {
    let records = query(store, range)?;
    Ok(aggregate(&records))
}
