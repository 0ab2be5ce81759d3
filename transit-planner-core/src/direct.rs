//! Component E — Direct-Trip Finder (spec §4.E).

use crate::model::{Leg, StopId, Time};
use crate::service_day::ValidTrips;
use crate::trip_index::TripIndex;

/// Finds the best single-trip connection from `source` to any stop in
/// `targets` (each tagged with its distance in km to the geocoded
/// destination), departing strictly after `earliest_departure`.
///
/// Selection rule: smaller distance from destination first, then earlier
/// departure time (spec §4.E). Never fails — returns `None` when no
/// eligible leg exists.
pub fn find_direct_trip(
    index: &TripIndex,
    valid: &ValidTrips,
    source: &str,
    targets: &[(StopId, f64)],
    earliest_departure: Time,
) -> Option<Leg> {
    let mut best: Option<(f64, Time, Leg)> = None;

    for (trip_id, source_pos) in index.occurrences_at_stop(source) {
        let stop_times = index.trip_stop_times(trip_id);
        let source_st = &stop_times[*source_pos];
        if source_st.departure_time <= earliest_departure {
            continue;
        }

        for (target_stop, target_distance) in targets {
            // A target can appear more than once on the same trip (loop
            // routes); consider every later occurrence and keep the best.
            for target_st in stop_times.iter().skip(source_pos + 1) {
                if &target_st.stop_id != target_stop {
                    continue;
                }
                let candidate_key = (*target_distance, source_st.departure_time);
                let better = match &best {
                    None => true,
                    Some((best_distance, best_departure, _)) => {
                        candidate_key < (*best_distance, *best_departure)
                    }
                };
                if better {
                    let meta = valid.meta.get(trip_id);
                    let leg = Leg {
                        from_stop: source_st.stop_id.clone(),
                        to_stop: target_st.stop_id.clone(),
                        trip_id: trip_id.clone(),
                        route_id: meta.map(|m| m.route_id.clone()).unwrap_or_default(),
                        headsign: meta.map(|m| m.headsign.clone()).unwrap_or_default(),
                        departure_time: source_st.departure_time,
                        arrival_time: target_st.arrival_time,
                    };
                    best = Some((*target_distance, source_st.departure_time, leg));
                }
            }
        }
    }

    best.map(|(_, _, leg)| leg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_day::compute_valid_trips;
    use crate::test_support::{sample_feed, scenario_monday};

    #[test]
    fn finds_direct_trip_e1() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let targets = vec![("S3".to_string(), 0.11)];
        let leg = find_direct_trip(&index, &valid, "S1", &targets, 7 * 3600 + 30 * 60).unwrap();

        assert_eq!(leg.trip_id, "T1");
        assert_eq!(leg.to_stop, "S3");
        assert_eq!(leg.departure_time, 8 * 3600);
        assert_eq!(leg.arrival_time, 8 * 3600 + 20 * 60);
    }

    #[test]
    fn no_direct_trip_after_departure_e2() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let targets = vec![("S3".to_string(), 0.11)];
        // Departing at 08:15 misses T1 entirely (it already left S1 at 08:00).
        let leg = find_direct_trip(&index, &valid, "S1", &targets, 8 * 3600 + 15 * 60);
        assert!(leg.is_none());
    }
}
