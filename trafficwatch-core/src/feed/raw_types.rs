use serde::{Deserialize, Deserializer};

use crate::Millis;

/// Body of one feed delivery.
///
/// Absent or `null` lists decode as empty.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedPayload {
    #[serde(deserialize_with = "null_as_empty")]
    pub alerts: Vec<FeedAlert>,
    #[serde(deserialize_with = "null_as_empty")]
    pub jams: Vec<FeedJam>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FeedCoord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedAlert {
    pub location: Option<FeedCoord>,
    pub pub_millis: Option<Millis>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub street: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedJam {
    #[serde(deserialize_with = "null_as_empty")]
    pub segments: Vec<FeedCoord>,
    #[serde(rename = "speedKMH")]
    pub speed_kmh: Option<f64>,
    pub pub_millis: Option<Millis>,
    pub street: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
