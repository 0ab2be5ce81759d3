//! Component F — Connection Expander (spec §4.F).

use crate::model::{RouteId, StopId, Time, TripId};
use crate::service_day::ValidTrips;
use crate::trip_index::TripIndex;

/// One onward connection reachable from a stop without a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub next_stop: StopId,
    pub arrival_time: Time,
    pub departure_time_from_source: Time,
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub headsign: String,
}

/// Every stop reachable from `stop` on a valid trip whose departure from
/// `stop` is strictly later than `earliest`, with no deduplication across
/// trips (spec §4.F). Never fails.
pub fn expand_connections(
    index: &TripIndex,
    valid: &ValidTrips,
    stop: &str,
    earliest: Time,
) -> Vec<Connection> {
    let mut connections = Vec::new();

    for (trip_id, pos) in index.occurrences_at_stop(stop) {
        let stop_times = index.trip_stop_times(trip_id);
        let here = &stop_times[*pos];
        if here.departure_time <= earliest {
            continue;
        }

        let meta = valid.meta.get(trip_id);
        let route_id = meta.map(|m| m.route_id.clone()).unwrap_or_default();
        let headsign = meta.map(|m| m.headsign.clone()).unwrap_or_default();

        for later in stop_times.iter().skip(pos + 1) {
            connections.push(Connection {
                next_stop: later.stop_id.clone(),
                arrival_time: later.arrival_time,
                departure_time_from_source: here.departure_time,
                trip_id: trip_id.clone(),
                route_id: route_id.clone(),
                headsign: headsign.clone(),
            });
        }
    }

    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_day::compute_valid_trips;
    use crate::test_support::{sample_feed, scenario_monday};

    #[test]
    fn expands_onward_stops_without_transfer() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let connections = expand_connections(&index, &valid, "S1", 7 * 3600);
        let targets: Vec<&str> = connections.iter().map(|c| c.next_stop.as_str()).collect();
        assert_eq!(targets, vec!["S2", "S3"]);
    }

    #[test]
    fn respects_earliest_departure_bound() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);

        let connections = expand_connections(&index, &valid, "S1", 8 * 3600);
        assert!(connections.is_empty());
    }
}
