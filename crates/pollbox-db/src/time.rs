use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

/// Timestamps are stored as UTC RFC 3339 text with a fixed six-digit
/// fractional second, e.g. `2024-01-10T00:00:00.000000Z`. The fixed width
/// makes SQL string comparison agree with chronological order, which the
/// publication filter and ordering rely on.
pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub fn decode_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("bad timestamp '{}': {}", s, e))
}
