use geo::Point;

/// Stable identifier for a stop, as it appears in the GTFS `stops` table.
pub type StopId = String;

/// A transit stop. Immutable once the feed is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_name: String,
    /// Geographic position, if `stop_lat`/`stop_lon` were present in the feed.
    pub geometry: Option<Point<f64>>,
}
