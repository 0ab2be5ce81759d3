//! Component B — Service-Day Filter (spec §4.B).

use chrono::NaiveDate;
use hashbrown::{HashMap, HashSet};

use crate::loading::FeedStore;
use crate::model::{RouteId, RouteType, TripId};

/// Quick-lookup metadata for a valid trip: its route and headsign, so the
/// search layer never has to re-resolve `trip_id -> route_id` on the hot
/// path.
#[derive(Debug, Clone)]
pub struct TripMeta {
    pub route_id: RouteId,
    pub headsign: String,
}

/// The set of trips active on a given date (and matching an optional
/// route-type filter), plus their route/headsign metadata (spec §4.B).
#[derive(Debug, Clone, Default)]
pub struct ValidTrips {
    pub trip_ids: HashSet<TripId>,
    pub meta: HashMap<TripId, TripMeta>,
}

impl ValidTrips {
    pub fn is_empty(&self) -> bool {
        self.trip_ids.is_empty()
    }

    pub fn contains(&self, trip_id: &str) -> bool {
        self.trip_ids.contains(trip_id)
    }
}

/// Computes the valid-trip set for `date`, optionally restricted to a
/// single `route_type`. Linear in the number of trips; never fails (an
/// empty result is a valid outcome, surfaced by the caller as
/// `NoServiceOnDate`).
pub fn compute_valid_trips(
    feed: &FeedStore,
    date: NaiveDate,
    route_type_filter: Option<RouteType>,
) -> ValidTrips {
    let matching_routes: HashSet<&str> = feed
        .routes()
        .iter()
        .filter(|r| route_type_filter.map_or(true, |filter| r.route_type.code() == filter.code()))
        .map(|r| r.route_id.as_str())
        .collect();

    let mut result = ValidTrips::default();
    for trip in feed.trips() {
        if !matching_routes.contains(trip.route_id.as_str()) {
            continue;
        }
        if !feed.is_service_active(&trip.service_id, date) {
            continue;
        }
        result.trip_ids.insert(trip.trip_id.clone());
        result.meta.insert(
            trip.trip_id.clone(),
            TripMeta {
                route_id: trip.route_id.clone(),
                headsign: trip.trip_headsign.clone(),
            },
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_feed;

    #[test]
    fn filters_by_active_service_day() {
        let feed = sample_feed();
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(); // a Monday
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();

        let monday_trips = compute_valid_trips(&feed, monday, None);
        assert!(!monday_trips.is_empty());

        let sunday_trips = compute_valid_trips(&feed, sunday, None);
        assert!(sunday_trips.is_empty(), "service C only runs on Monday");
    }

    #[test]
    fn filters_by_route_type() {
        let feed = sample_feed();
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();

        let bus_trips = compute_valid_trips(&feed, monday, Some(RouteType::Bus));
        assert!(!bus_trips.is_empty());

        let metro_trips = compute_valid_trips(&feed, monday, Some(RouteType::Metro));
        assert!(metro_trips.is_empty());
    }
}
