//! Flat-file persistence of ingested batches
//!
//! Every ingestion writes one raw JSON file and one processed CSV file, both
//! named after the batch identifier. Batches are never modified afterwards.

mod batch;
mod store;

pub use batch::{BatchId, date_token};
pub use store::{BatchStore, read_processed};
