use serde::Deserialize;

use super::parser::{deserialize_gtfs_date, deserialize_gtfs_time};

#[derive(Debug, Deserialize)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedRoute {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: u16,
}

#[derive(Debug, Deserialize)]
pub struct FeedService {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub start_date: chrono::NaiveDate,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub end_date: chrono::NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct FeedTrip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub trip_headsign: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedStopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub arrival_time: u32,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub departure_time: u32,
}

/// A row of the optional `calendar_dates.txt` file.
#[derive(Debug, Deserialize)]
pub struct FeedCalendarDate {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub date: chrono::NaiveDate,
    /// GTFS: 1 = service added for this date, 2 = service removed.
    pub exception_type: u8,
}

/// A row of the optional `transfers.txt` file. Only the stop-to-stop
/// walking-time form is consulted (spec §4.A: other tables are parsed
/// best-effort and are not required inputs).
#[derive(Debug, Deserialize)]
pub struct FeedTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub transfer_type: u8,
    pub min_transfer_time: Option<u32>,
}
