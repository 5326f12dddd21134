// Re-export key components
pub use crate::feed::{
    Extraction, Extractor, ExtractorConfig, FeedAlert, FeedCoord, FeedJam, FeedPayload, ItemRef,
};
pub use crate::model::{IncidentRecord, IncidentType, ReferenceRoute};
pub use crate::query::{DateRange, TrafficStats, aggregate, query, traffic_stats};
pub use crate::storage::{BatchId, BatchStore};

pub use crate::Error;

// Units
pub use crate::Meters;
pub use crate::Millis;
pub use crate::Minutes;
