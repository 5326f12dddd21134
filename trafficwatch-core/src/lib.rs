//! Core of the traffic watcher: relates feed alerts and jams to a reference
//! route, estimates the delay they cause and keeps the resulting batches on
//! disk for later querying.

pub mod algo;
mod error;
pub mod feed;
pub mod model;
pub mod prelude;
pub mod query;
pub mod storage;

pub use error::Error;
pub use feed::{Extraction, Extractor, ExtractorConfig, ItemRef};
pub use model::{IncidentRecord, IncidentType, ReferenceRoute};
pub use query::{DateRange, TrafficStats, query, traffic_stats};
pub use storage::{BatchId, BatchStore};

/// Epoch milliseconds as reported by the feed
pub type Millis = i64;
/// Delay in minutes
pub type Minutes = f64;
/// Distance in meters
pub type Meters = f64;
