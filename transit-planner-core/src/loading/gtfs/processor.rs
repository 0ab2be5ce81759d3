use std::path::Path;

use hashbrown::{HashMap, HashSet};
use log::{info, warn};

use super::parser::{deserialize_gtfs_table, deserialize_gtfs_table_optional};
use super::raw_types::{
    FeedCalendarDate, FeedRoute, FeedService, FeedStop, FeedStopTime, FeedTransfer, FeedTrip,
};
use crate::error::FeedError;
use crate::loading::feed_store::FeedStore;
use crate::model::{
    CalendarEntry, CalendarException, ExceptionType, Route, RouteType, Stop, StopTime, Trip,
};

/// Builds a [`FeedStore`] from a directory of GTFS text files (spec §4.A,
/// §6). `stops.txt`, `routes.txt`, `calendar.txt`, `trips.txt` and
/// `stop_times.txt` are required; `calendar_dates.txt` and
/// `transfers.txt` are read if present and ignored otherwise.
pub fn load_feed(dir: &Path) -> Result<FeedStore, FeedError> {
    let raw_stops: Vec<FeedStop> = deserialize_gtfs_table(&dir.join("stops.txt"), "stops.txt")?;
    let raw_routes: Vec<FeedRoute> =
        deserialize_gtfs_table(&dir.join("routes.txt"), "routes.txt")?;
    let raw_calendar: Vec<FeedService> =
        deserialize_gtfs_table(&dir.join("calendar.txt"), "calendar.txt")?;
    let raw_trips: Vec<FeedTrip> = deserialize_gtfs_table(&dir.join("trips.txt"), "trips.txt")?;
    let raw_stop_times: Vec<FeedStopTime> =
        deserialize_gtfs_table(&dir.join("stop_times.txt"), "stop_times.txt")?;
    let raw_calendar_dates: Vec<FeedCalendarDate> = deserialize_gtfs_table_optional(
        &dir.join("calendar_dates.txt"),
        "calendar_dates.txt",
    )?;
    let raw_transfers: Vec<FeedTransfer> =
        deserialize_gtfs_table_optional(&dir.join("transfers.txt"), "transfers.txt")?;

    info!(
        "loaded raw feed: {} stops, {} routes, {} calendar rows, {} trips, {} stop_times",
        raw_stops.len(),
        raw_routes.len(),
        raw_calendar.len(),
        raw_trips.len(),
        raw_stop_times.len()
    );

    reject_duplicate_keys(&raw_stops, |s| &s.stop_id, "stops.txt")?;
    reject_duplicate_keys(&raw_routes, |r| &r.route_id, "routes.txt")?;
    reject_duplicate_keys(&raw_calendar, |c| &c.service_id, "calendar.txt")?;
    reject_duplicate_keys(&raw_trips, |t| &t.trip_id, "trips.txt")?;

    let known_stops: HashSet<&str> = raw_stops.iter().map(|s| s.stop_id.as_str()).collect();
    let known_trips: HashSet<&str> = raw_trips.iter().map(|t| t.trip_id.as_str()).collect();

    let stops: Vec<Stop> = raw_stops
        .into_iter()
        .map(|s| Stop {
            stop_id: s.stop_id,
            stop_name: s.stop_name,
            geometry: match (s.stop_lon, s.stop_lat) {
                (Some(lon), Some(lat)) => Some(geo::Point::new(lon, lat)),
                _ => None,
            },
        })
        .collect();

    let routes: Vec<Route> = raw_routes
        .into_iter()
        .map(|r| Route {
            route_id: r.route_id,
            route_type: RouteType::from_code(r.route_type),
            route_short_name: r.route_short_name,
            route_long_name: r.route_long_name,
        })
        .collect();

    let calendar: Vec<CalendarEntry> = raw_calendar
        .into_iter()
        .map(|c| CalendarEntry {
            service_id: c.service_id,
            weekdays: [
                c.monday != 0,
                c.tuesday != 0,
                c.wednesday != 0,
                c.thursday != 0,
                c.friday != 0,
                c.saturday != 0,
                c.sunday != 0,
            ],
            start_date: c.start_date,
            end_date: c.end_date,
        })
        .collect();

    let calendar_exceptions: Vec<CalendarException> = raw_calendar_dates
        .into_iter()
        .filter_map(|e| {
            let exception_type = match e.exception_type {
                1 => ExceptionType::Added,
                2 => ExceptionType::Removed,
                other => {
                    warn!("calendar_dates.txt: unknown exception_type {other}, skipping row");
                    return None;
                }
            };
            Some(CalendarException {
                service_id: e.service_id,
                date: e.date,
                exception_type,
            })
        })
        .collect();

    let trips: Vec<Trip> = raw_trips
        .into_iter()
        .map(|t| Trip {
            trip_id: t.trip_id,
            route_id: t.route_id,
            service_id: t.service_id,
            trip_headsign: t.trip_headsign,
        })
        .collect();

    let stop_times = build_stop_times(raw_stop_times, &known_stops, &known_trips);

    let mut transfer_times = HashMap::new();
    for t in raw_transfers {
        if let Some(seconds) = t.min_transfer_time {
            transfer_times.insert((t.from_stop_id, t.to_stop_id), seconds);
        }
    }

    Ok(FeedStore::new(
        stops,
        routes,
        calendar,
        calendar_exceptions,
        trips,
        stop_times,
        transfer_times,
    ))
}

/// Drops `stop_times` rows referencing an unknown trip or stop (the
/// `StopTime` invariant in spec §3 assumes referential integrity; a feed
/// that violates it is logged and pruned rather than rejected outright,
/// since spec §4.A only names `Missing`/`Malformed`/duplicate-key as
/// error conditions for ingestion).
fn build_stop_times(
    raw_stop_times: Vec<FeedStopTime>,
    known_stops: &HashSet<&str>,
    known_trips: &HashSet<&str>,
) -> Vec<StopTime> {
    let mut by_trip: HashMap<String, Vec<FeedStopTime>> = HashMap::new();
    let mut dropped = 0usize;
    for st in raw_stop_times {
        if !known_trips.contains(st.trip_id.as_str()) || !known_stops.contains(st.stop_id.as_str())
        {
            dropped += 1;
            continue;
        }
        by_trip.entry(st.trip_id.clone()).or_default().push(st);
    }
    if dropped > 0 {
        warn!("dropped {dropped} stop_times rows referencing unknown trip_id/stop_id");
    }

    let mut stop_times = Vec::new();
    for rows in by_trip.into_values() {
        let mut rows = rows;
        rows.sort_by_key(|r| r.stop_sequence);
        for r in rows {
            stop_times.push(StopTime {
                trip_id: r.trip_id,
                stop_id: r.stop_id,
                stop_sequence: r.stop_sequence,
                arrival_time: r.arrival_time,
                departure_time: r.departure_time,
            });
        }
    }
    stop_times
}

fn reject_duplicate_keys<T>(
    rows: &[T],
    key: impl Fn(&T) -> &str,
    table: &str,
) -> Result<(), FeedError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let k = key(row);
        if seen.insert(k, idx).is_some() {
            return Err(FeedError::Malformed(table.to_string(), idx + 2));
        }
    }
    Ok(())
}
