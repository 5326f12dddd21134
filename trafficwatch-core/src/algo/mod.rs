//! Geometric filtering and delay estimation

pub mod delay;
pub mod geometry;

pub use delay::{alert_delay, jam_delay};
pub use geometry::{distance_to_route, intersects_route, polyline_length};
