//! Top-level query orchestration: wires the Geocoder Client (I) through
//! the Geo Index (D), Service-Day Filter (B), Trip Index (C), and the
//! Walk-Fallback Orchestrator (H) to answer one external query (spec §6).

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::error::{NoJourneyReason, PlannerError};
use crate::geo_index::GeoIndex;
use crate::geocode::GeocodeClient;
use crate::loading::FeedStore;
use crate::model::{Journey, RouteType, Time};
use crate::walk_fallback::run_with_fallback;

/// Default maximum transfers when a query doesn't specify one (spec §6).
pub const DEFAULT_MAX_TRANSFERS: usize = 2;

/// Default wall-clock query budget (spec §5).
pub const DEFAULT_QUERY_BUDGET: Duration = Duration::from_secs(120);

/// One external query (spec §6 "Inputs (per query)").
#[derive(Debug, Clone)]
pub struct Query {
    pub source_stop_id: String,
    pub destination_place: String,
    pub departure_time: Time,
    pub departure_date: NaiveDate,
    pub route_type_filter: Option<RouteType>,
    pub max_transfers: usize,
    /// Wall-clock budget for the whole query (spec §5). `None` disables
    /// the deadline check entirely.
    pub query_budget: Option<Duration>,
}

/// Result of a query that completed without a hard error: either a
/// Journey, or a soft failure with a reason code (spec §7).
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    Found(Journey),
    NotFound(NoJourneyReason),
}

/// Runs a single query end to end. Returns `Err` only for the hard
/// failures in spec §7 (bad source stop id, geocoding failure); every
/// other outcome — including "no service today" and "no journey" — is a
/// successful `Ok(QueryOutcome::NotFound(..))`.
pub async fn run_query(
    feed: &FeedStore,
    geocoder: &dyn GeocodeClient,
    query: &Query,
) -> Result<QueryOutcome, PlannerError> {
    if feed.stop(&query.source_stop_id).is_none() {
        return Err(PlannerError::UnknownStop(query.source_stop_id.clone()));
    }

    // Distinguish "nothing runs today at all" (NoServiceOnDate) from "the
    // route-type filter emptied an otherwise-active day" — the latter
    // flows through to the search layer and surfaces as plain NoJourney
    // (spec §8 scenarios E4 vs E5). Both lookups go through the feed's
    // trip-index cache, so a process serving many queries against the
    // same date only pays for each (date, route_type) combination once.
    let cache = feed.trip_index_cache();
    let any_service_today = !cache.get_or_build(feed, query.departure_date, None).0.is_empty();
    if !any_service_today {
        return Ok(QueryOutcome::NotFound(NoJourneyReason::NoServiceOnDate));
    }
    let cached = cache.get_or_build(feed, query.departure_date, query.route_type_filter);
    let (valid, trip_index) = (&cached.0, &cached.1);

    let place = geocoder.geocode(&query.destination_place).await?;
    let destination = geo::Point::new(place.lon, place.lat);

    let geo_index = GeoIndex::build(feed.stops());
    let deadline = query.query_budget.map(|budget| Instant::now() + budget);

    let outcome = run_with_fallback(
        feed,
        trip_index,
        &geo_index,
        valid,
        &query.source_stop_id,
        destination,
        query.departure_time,
        query.max_transfers,
        deadline,
    );

    match outcome.journey {
        Some(journey) => Ok(QueryOutcome::Found(journey)),
        None if outcome.timed_out => Ok(QueryOutcome::NotFound(NoJourneyReason::Timeout)),
        None if outcome.iteration_cap_hit => {
            Ok(QueryOutcome::NotFound(NoJourneyReason::IterationCap))
        }
        None => Ok(QueryOutcome::NotFound(NoJourneyReason::NoJourney)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::StaticGeocoder;
    use crate::test_support::{sample_feed, scenario_monday};

    fn destination_geocoder() -> StaticGeocoder {
        StaticGeocoder::new(vec![("destination", 0.0, 0.021)])
    }

    #[tokio::test]
    async fn e1_direct_query_succeeds() {
        let feed = sample_feed();
        let geocoder = destination_geocoder();
        let query = Query {
            source_stop_id: "S1".to_string(),
            destination_place: "destination".to_string(),
            departure_time: 7 * 3600 + 30 * 60,
            departure_date: scenario_monday(),
            route_type_filter: None,
            max_transfers: DEFAULT_MAX_TRANSFERS,
            query_budget: None,
        };

        let outcome = run_query(&feed, &geocoder, &query).await.unwrap();
        match outcome {
            QueryOutcome::Found(journey) => assert_eq!(journey.transfers(), 0),
            QueryOutcome::NotFound(reason) => panic!("expected a journey, got {reason:?}"),
        }
    }

    #[tokio::test]
    async fn e4_no_service_on_date() {
        let feed = sample_feed();
        let geocoder = destination_geocoder();
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        let query = Query {
            source_stop_id: "S1".to_string(),
            destination_place: "destination".to_string(),
            departure_time: 7 * 3600 + 30 * 60,
            departure_date: sunday,
            route_type_filter: None,
            max_transfers: DEFAULT_MAX_TRANSFERS,
            query_budget: None,
        };

        let outcome = run_query(&feed, &geocoder, &query).await.unwrap();
        assert!(matches!(
            outcome,
            QueryOutcome::NotFound(NoJourneyReason::NoServiceOnDate)
        ));
    }

    #[tokio::test]
    async fn e5_route_filter_eliminates_all_trips() {
        let feed = sample_feed();
        let geocoder = destination_geocoder();
        let query = Query {
            source_stop_id: "S1".to_string(),
            destination_place: "destination".to_string(),
            departure_time: 7 * 3600 + 30 * 60,
            departure_date: scenario_monday(),
            route_type_filter: Some(RouteType::Metro),
            max_transfers: DEFAULT_MAX_TRANSFERS,
            query_budget: None,
        };

        let outcome = run_query(&feed, &geocoder, &query).await.unwrap();
        assert!(matches!(
            outcome,
            QueryOutcome::NotFound(NoJourneyReason::NoJourney)
        ));
    }

    #[tokio::test]
    async fn unknown_source_stop_is_a_hard_error() {
        let feed = sample_feed();
        let geocoder = destination_geocoder();
        let query = Query {
            source_stop_id: "nope".to_string(),
            destination_place: "destination".to_string(),
            departure_time: 7 * 3600 + 30 * 60,
            departure_date: scenario_monday(),
            route_type_filter: None,
            max_transfers: DEFAULT_MAX_TRANSFERS,
            query_budget: None,
        };

        let err = run_query(&feed, &geocoder, &query).await.unwrap_err();
        assert!(matches!(err, PlannerError::UnknownStop(_)));
    }
}
