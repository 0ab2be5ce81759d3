//! Convenience re-exports for downstream crates (the CLI, in particular).

pub use crate::direct::find_direct_trip;
pub use crate::error::{FeedError, GeocodeError, NoJourneyReason, PlannerError};
pub use crate::expander::{expand_connections, Connection};
pub use crate::geo_index::GeoIndex;
pub use crate::geocode::{GeocodeClient, GeocodedPlace, HttpGeocoder, StaticGeocoder};
pub use crate::loading::{load_feed, FeedStore};
pub use crate::model::{Journey, Leg, Route, RouteType, Stop, Walk};
pub use crate::query::{run_query, Query, QueryOutcome, DEFAULT_MAX_TRANSFERS, DEFAULT_QUERY_BUDGET};
pub use crate::search::{best_first_search, SearchOutcome};
pub use crate::service_day::{compute_valid_trips, ValidTrips};
pub use crate::trip_index::{TripIndex, TripIndexCache};
pub use crate::walk_fallback::{run_with_fallback, FallbackOutcome};
