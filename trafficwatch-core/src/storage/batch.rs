use std::fmt;

use chrono::{DateTime, Utc};

/// Identifier of one ingested batch.
///
/// Rendered as `YYYYMMDD_HHMMSS_ffffff_NNNN`: UTC ingestion time with
/// microseconds, then a per-process sequence number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId {
    taken_at: DateTime<Utc>,
    seq: u64,
}

impl BatchId {
    pub fn new(taken_at: DateTime<Utc>, seq: u64) -> Self {
        Self { taken_at, seq }
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `YYYYMMDD` date the batch is filed under
    pub fn date_token(&self) -> String {
        self.taken_at.format("%Y%m%d").to_string()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{:04}",
            self.taken_at.format("%Y%m%d_%H%M%S_%6f"),
            self.seq
        )
    }
}

/// Date token of a batch file name: the text between the first and second
/// underscore.
pub fn date_token(file_name: &str) -> Option<&str> {
    file_name.split('_').nth(1)
}
