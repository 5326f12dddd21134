//! Data model for route-filtered traffic incidents
//!
//! Contains the reference route and the flat incident records produced from
//! a feed payload.

pub mod record;
pub mod route;

pub use record::{IncidentRecord, IncidentType, RECORD_HEADERS};
pub use route::ReferenceRoute;
