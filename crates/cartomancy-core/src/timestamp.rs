//! Serde codec for the dataset timestamp format.
//!
//! Every timestamp in the emitted files is a naive local datetime rendered
//! as `YYYY-MM-DDTHH:MM:SS`, with no timezone suffix and no sub-second
//! digits. Chrono would happily print fractional seconds for some values,
//! so record structs pin the format through this module with
//! `#[serde(with = "crate::timestamp")]` instead of relying on the default
//! `NaiveDateTime` impls.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

/// Render format shared by every timestamp field in the dataset.
pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Formats a timestamp the way it appears in the emitted JSON.
pub fn format(value: NaiveDateTime) -> String {
    value.format(FORMAT).to_string()
}

/// Parses a timestamp in the emitted format.
pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, FORMAT)
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(FORMAT))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}
