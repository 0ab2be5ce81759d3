use thiserror::Error;

/// Errors raised while ingesting a GTFS feed. Fatal: the planner cannot
/// serve queries against a feed that fails to load.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("required GTFS table is missing: {0}")]
    Missing(String),
    #[error("malformed row in {0} at line {1}")]
    Malformed(String, usize),
    #[error("I/O error reading feed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the Geocoder Client (spec §4.I / §6). Per-query,
/// never process-fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("no results for place query")]
    NoResults,
    #[error("geocoder denied the request (bad/missing API key)")]
    AuthDenied,
    #[error("network error contacting geocoder: {0}")]
    NetworkError(String),
    #[error("could not parse geocoder response: {0}")]
    ParseError(String),
}

/// Soft failure reasons surfaced on a query result rather than as an
/// `Err`, per spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoJourneyReason {
    NoServiceOnDate,
    NoJourney,
    Timeout,
    IterationCap,
}

/// Top-level error type for anything that *does* abort a query outright
/// (as opposed to the soft `NoJourneyReason` outcomes, which are valid
/// results).
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("unknown source stop id: {0}")]
    UnknownStop(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
