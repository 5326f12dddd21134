//! This module is responsible for decoding feed payloads and turning them
//! into route-relevant incident records.

mod config;
mod extractor;
mod raw_types;

pub use config::{DEFAULT_ROUTE, ExtractorConfig};
pub use extractor::{Extraction, Extractor, ItemRef};
pub use raw_types::{FeedAlert, FeedCoord, FeedJam, FeedPayload};
