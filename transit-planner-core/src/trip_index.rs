//! Component C — Trip Index (spec §4.C).

use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::loading::FeedStore;
use crate::model::{RouteType, StopId, StopTime, TripId};
use crate::service_day::{compute_valid_trips, ValidTrips};

/// Position of a stop within a trip's ordered stop-time list.
pub type Position = usize;

/// For a valid trip set, an ordered-by-`stop_sequence` list of stop-times
/// per trip, plus a secondary `stop_id -> (trip_id, position)` index used
/// by the Connection Expander (spec §4.C). Immutable after construction.
#[derive(Debug)]
pub struct TripIndex {
    by_trip: HashMap<TripId, Vec<StopTime>>,
    by_stop: HashMap<StopId, Vec<(TripId, Position)>>,
}

impl TripIndex {
    /// Builds the index for exactly the trips in `valid`. `feed.stop_times()`
    /// is already sorted by `stop_sequence` within each trip (spec §4.A),
    /// so this is a single filtering + grouping pass.
    pub fn build(feed: &FeedStore, valid: &ValidTrips) -> Self {
        let mut by_trip: HashMap<TripId, Vec<StopTime>> = HashMap::new();
        for st in feed.stop_times() {
            if !valid.contains(&st.trip_id) {
                continue;
            }
            by_trip.entry(st.trip_id.clone()).or_default().push(st.clone());
        }

        let mut by_stop: HashMap<StopId, Vec<(TripId, Position)>> = HashMap::new();
        for (trip_id, stop_times) in &by_trip {
            for (pos, st) in stop_times.iter().enumerate() {
                by_stop
                    .entry(st.stop_id.clone())
                    .or_default()
                    .push((trip_id.clone(), pos));
            }
        }

        TripIndex { by_trip, by_stop }
    }

    /// Ordered stop-times for `trip_id`, or `&[]` if the trip isn't in
    /// this index.
    pub fn trip_stop_times(&self, trip_id: &str) -> &[StopTime] {
        self.by_trip.get(trip_id).map_or(&[], |v| v.as_slice())
    }

    /// Every `(trip_id, position)` at which `stop_id` appears across the
    /// valid trip set.
    pub fn occurrences_at_stop(&self, stop_id: &str) -> &[(TripId, Position)] {
        self.by_stop.get(stop_id).map_or(&[], |v| v.as_slice())
    }
}

/// `(date, route_type)`-keyed cache of `ValidTrips` + `TripIndex`
/// construction, so repeated queries against the same `FeedStore` within
/// a process don't recompute either (spec §3 Lifecycle). A plain
/// `HashMap` behind a read-write lock is enough at this scale; no
/// eviction is attempted.
#[derive(Debug, Default)]
pub struct TripIndexCache {
    entries: RwLock<HashMap<(NaiveDate, Option<RouteType>), Arc<(ValidTrips, TripIndex)>>>,
}

impl TripIndexCache {
    pub fn new() -> Self {
        TripIndexCache::default()
    }

    /// Returns the cached `(ValidTrips, TripIndex)` for `(date,
    /// route_type_filter)`, building and inserting it on a miss.
    pub fn get_or_build(
        &self,
        feed: &FeedStore,
        date: NaiveDate,
        route_type_filter: Option<RouteType>,
    ) -> Arc<(ValidTrips, TripIndex)> {
        let key = (date, route_type_filter);
        if let Some(hit) = self.entries.read().unwrap().get(&key) {
            return Arc::clone(hit);
        }

        let valid = compute_valid_trips(feed, date, route_type_filter);
        let index = TripIndex::build(feed, &valid);
        let built = Arc::new((valid, index));
        self.entries.write().unwrap().insert(key, Arc::clone(&built));
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_feed, scenario_monday};

    #[test]
    fn groups_stop_times_by_trip_in_sequence_order() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let t1 = index.trip_stop_times("T1");
        let sequences: Vec<u32> = t1.iter().map(|st| st.stop_sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn indexes_occurrences_by_stop() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let occurrences = index.occurrences_at_stop("S2");
        assert_eq!(occurrences.len(), 2); // S2 appears on T1 and T2
    }

    #[test]
    fn cache_reuses_the_same_index_for_a_repeated_key() {
        let feed = sample_feed();
        let cache = TripIndexCache::new();

        let first = cache.get_or_build(&feed, scenario_monday(), None);
        let second = cache.get_or_build(&feed, scenario_monday(), None);
        assert!(Arc::ptr_eq(&first, &second));

        let filtered = cache.get_or_build(&feed, scenario_monday(), Some(RouteType::Bus));
        assert!(!Arc::ptr_eq(&first, &filtered));
    }
}
