use super::calendar::ServiceId;
use super::route::RouteId;
use super::stop::StopId;

/// Stable identifier for a trip, as it appears in the GTFS `trips` table.
pub type TripId = String;

/// Wall-clock time, stored as seconds since the start of the service day.
/// GTFS permits `HH >= 24` to denote the next service day; normalizing to
/// seconds here (rather than comparing `HH:MM:SS` strings lexicographically)
/// resolves that open question (spec §9) once and for all: arithmetic
/// comparison is always correct regardless of how large `HH` is.
pub type Time = u32;

/// A scheduled trip. Immutable once the feed is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub service_id: ServiceId,
    pub trip_headsign: String,
}

/// A single GTFS `stop_times` row, already resolved to a `Time` and still
/// tagged with its owning trip and stop (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StopTime {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
}
