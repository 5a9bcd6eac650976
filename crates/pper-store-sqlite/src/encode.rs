//! Text encodings for values stored in SQLite columns.
//!
//! Timestamps are RFC 3339 in UTC with a fixed nine-digit fraction, so they
//! round-trip exactly and sort lexicographically in `ORDER BY`.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn dt_value(dt: DateTime<Utc>) -> Value { Value::Text(encode_dt(dt)) }

pub fn opt_dt_value(dt: Option<DateTime<Utc>>) -> Value {
  dt.map_or(Value::Null, dt_value)
}
