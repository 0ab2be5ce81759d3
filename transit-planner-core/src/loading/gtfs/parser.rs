use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::FeedError;

/// Deserializes every row of a GTFS CSV file, propagating a `Malformed`
/// error (with 1-based line number, counting the header as line 1) for
/// the first row that fails to parse into `T`.
///
/// Quoted fields (so a `trip_headsign` containing a comma survives intact)
/// are handled by the underlying `csv` reader, not by hand-rolled
/// splitting (spec §9 "pattern rewrites").
pub fn deserialize_gtfs_table<T>(path: &Path, table: &str) -> Result<Vec<T>, FeedError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|_| FeedError::Missing(table.to_string()))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|_| FeedError::Malformed(table.to_string(), idx + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Like [`deserialize_gtfs_table`], but returns an empty vec instead of
/// `Missing` when the file is absent, for GTFS's optional tables
/// (`calendar_dates.txt`, `transfers.txt`).
pub fn deserialize_gtfs_table_optional<T>(path: &Path, table: &str) -> Result<Vec<T>, FeedError>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        return Ok(Vec::new());
    }
    deserialize_gtfs_table(path, table)
}

/// Parses a `HH:MM:SS` time string to seconds since the start of the
/// service day. `HH` may exceed 23 for next-day service; plain integer
/// arithmetic handles that correctly without special-casing.
pub fn parse_time(time_str: &str) -> u32 {
    let bytes = time_str.as_bytes();

    // Fast path: exactly `H+:MM:SS` with a 2-digit hour, which covers the
    // overwhelming majority of GTFS feeds including next-day (`HH >= 24`)
    // entries.
    if bytes.len() >= 8 && bytes[2] == b':' && bytes[5] == b':' {
        if let (Some(h0), Some(h1), Some(m0), Some(m1), Some(s0), Some(s1)) = (
            digit(bytes[0]),
            digit(bytes[1]),
            digit(bytes[3]),
            digit(bytes[4]),
            digit(bytes[6]),
            digit(bytes[7]),
        ) {
            let hours = h0 * 10 + h1;
            let minutes = m0 * 10 + m1;
            let seconds = s0 * 10 + s1;
            return hours * 3600 + minutes * 60 + seconds;
        }
    }

    parse_time_fallback(time_str)
}

fn digit(b: u8) -> Option<u32> {
    if b.is_ascii_digit() {
        Some(u32::from(b - b'0'))
    } else {
        None
    }
}

fn parse_time_fallback(time_str: &str) -> u32 {
    let mut parts = time_str.split(':');
    let hours = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minutes = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let seconds = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    hours * 3600 + minutes * 60 + seconds
}

pub(super) fn deserialize_gtfs_time<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let time_str = String::deserialize(deserializer)?;
    Ok(parse_time(&time_str))
}

pub(super) fn deserialize_gtfs_date<'de, D>(
    deserializer: D,
) -> Result<chrono::NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let date_str = String::deserialize(deserializer)?;
    chrono::NaiveDate::parse_from_str(&date_str, "%Y%m%d").map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::parse_time;

    #[test]
    fn parses_ordinary_time() {
        assert_eq!(parse_time("08:10:30"), 8 * 3600 + 10 * 60 + 30);
    }

    #[test]
    fn parses_next_day_time() {
        assert_eq!(parse_time("25:05:00"), 25 * 3600 + 5 * 60);
    }

    #[test]
    fn next_day_time_compares_correctly() {
        assert!(parse_time("25:05:00") > parse_time("23:55:00"));
    }
}
