//! Reading persisted batches back over a date range

use std::fmt;

use rayon::prelude::*;
use serde::Deserialize;

use crate::{
    Error,
    model::IncidentRecord,
    storage::{BatchStore, read_processed},
};

mod stats;

pub use stats::{TrafficStats, aggregate, traffic_stats};

/// Inclusive bounds on the `YYYYMMDD` date token of batch file names.
///
/// Bounds are compared as plain strings. Missing or empty bounds are open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        bound(self.from.as_deref()).is_none_or(|from| from <= token)
            && bound(self.to.as_deref()).is_none_or(|to| token <= to)
    }
}

fn bound(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (bound(self.from.as_deref()), bound(self.to.as_deref())) {
            (None, None) => f.write_str("any date"),
            (Some(from), None) => write!(f, "dates from {from}"),
            (None, Some(to)) => write!(f, "dates up to {to}"),
            (Some(from), Some(to)) => write!(f, "dates {from}..={to}"),
        }
    }
}

/// Loads and concatenates every batch in `range`, in file name order
///
/// # Errors
///
/// Returns `NotFound` if no batch file matches, or the first read error
pub fn query(store: &BatchStore, range: &DateRange) -> Result<Vec<IncidentRecord>, Error> {
    let files = store.processed_files(range)?;
    if files.is_empty() {
        return Err(Error::NotFound);
    }

    let batches = files
        .par_iter()
        .map(|path| read_processed(path))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(batches.into_iter().flatten().collect())
}
