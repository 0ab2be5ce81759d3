//! Literal GTFS-shaped fixtures used by unit tests across this crate,
//! built directly from the data model (not parsed from CSV) so tests stay
//! fast and deterministic. Implements the concrete scenario feed `F` from
//! spec §8.

use chrono::NaiveDate;
use geo::Point;
use hashbrown::HashMap;

use crate::loading::gtfs::parse_time;
use crate::loading::FeedStore;
use crate::model::{
    CalendarEntry, Route, RouteType, Stop, StopTime, Trip,
};

/// Coordinates are written `(lat, lon)` to match spec §8's prose; internally
/// stored as `geo::Point::new(lon, lat)` per that crate's `[lon, lat]`
/// convention.
fn point(lat: f64, lon: f64) -> Point<f64> {
    Point::new(lon, lat)
}

fn stop(id: &str, lat: f64, lon: f64) -> Stop {
    Stop {
        stop_id: id.to_string(),
        stop_name: id.to_string(),
        geometry: Some(point(lat, lon)),
    }
}

fn stop_time(trip: &str, stop_id: &str, seq: u32, arrival: &str, departure: &str) -> StopTime {
    StopTime {
        trip_id: trip.to_string(),
        stop_id: stop_id.to_string(),
        stop_sequence: seq,
        arrival_time: parse_time(arrival),
        departure_time: parse_time(departure),
    }
}

/// Builds the feed `F` of spec §8: stops `S1, S2, S3, W`, route `R`
/// (bus), service `C` (Monday only), trips `T1` (`S1->S2->S3`) and `T2`
/// (`S2->S3`).
pub fn sample_feed() -> FeedStore {
    let stops = vec![
        stop("S1", 0.0, 0.0),
        stop("S2", 0.0, 0.01),
        stop("S3", 0.0, 0.02),
        stop("W", 0.0, 0.003),
    ];

    let routes = vec![Route {
        route_id: "R".to_string(),
        route_type: RouteType::Bus,
        route_short_name: "R".to_string(),
        route_long_name: "Route R".to_string(),
    }];

    let calendar = vec![CalendarEntry {
        service_id: "C".to_string(),
        // Monday only.
        weekdays: [true, false, false, false, false, false, false],
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
    }];

    let trips = vec![
        Trip {
            trip_id: "T1".to_string(),
            route_id: "R".to_string(),
            service_id: "C".to_string(),
            trip_headsign: "Outbound".to_string(),
        },
        Trip {
            trip_id: "T2".to_string(),
            route_id: "R".to_string(),
            service_id: "C".to_string(),
            trip_headsign: "Outbound".to_string(),
        },
    ];

    let stop_times = vec![
        stop_time("T1", "S1", 1, "08:00:00", "08:00:00"),
        stop_time("T1", "S2", 2, "08:10:00", "08:10:30"),
        stop_time("T1", "S3", 3, "08:20:00", "08:20:00"),
        stop_time("T2", "S2", 1, "08:20:00", "08:20:00"),
        stop_time("T2", "S3", 2, "08:30:00", "08:30:00"),
    ];

    FeedStore::new(
        stops,
        routes,
        calendar,
        Vec::new(),
        trips,
        stop_times,
        HashMap::new(),
    )
}

/// Same feed as [`sample_feed`], but with `S3` removed from `T1` — used
/// by scenario E3 (forces a transfer via `T2`).
pub fn sample_feed_without_direct_trip() -> FeedStore {
    let feed = sample_feed();
    let stops = feed.stops().to_vec();
    let routes = feed.routes().to_vec();
    let trips = feed.trips().to_vec();
    let stop_times: Vec<StopTime> = feed
        .stop_times()
        .iter()
        .filter(|st| !(st.trip_id == "T1" && st.stop_id == "S3"))
        .cloned()
        .collect();

    FeedStore::new(
        stops,
        routes,
        vec![CalendarEntry {
            service_id: "C".to_string(),
            weekdays: [true, false, false, false, false, false, false],
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        }],
        Vec::new(),
        trips,
        stop_times,
        HashMap::new(),
    )
}

/// Monday, 2026-08-03 — the query date used throughout the §8 scenarios.
pub fn scenario_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
}
