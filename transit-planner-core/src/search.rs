//! Component G — Best-First Search (spec §4.G).

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use geo::Point;
use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use crate::expander::expand_connections;
use crate::geo_index::haversine_km;
use crate::loading::FeedStore;
use crate::model::{Journey, Leg, StopId, Time, TRANSFER_BUFFER_SECS};
use crate::service_day::ValidTrips;
use crate::trip_index::TripIndex;

/// Safety bound on frontier pops (spec §4.G).
const ITERATION_CAP: usize = 20_000;
/// "Good enough" early-termination threshold (spec §4.G rule 1).
const GOOD_ENOUGH_DISTANCE_KM: f64 = 0.35;

/// How often (in popped states) the search checks its wall-clock
/// deadline, if one was given. Checking every iteration would make
/// `Instant::now()` dominate the hot loop; this amortizes that cost.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Outcome of a single Best-First Search run.
pub struct SearchOutcome {
    pub journey: Option<Journey>,
    /// Set when the search stopped because it hit [`ITERATION_CAP`]
    /// rather than exhausting the frontier (spec §7 `IterationCap`).
    pub iteration_cap_hit: bool,
    /// Set when the search stopped because it passed its wall-clock
    /// `deadline` (spec §5 "Cancellation and timeouts").
    pub timed_out: bool,
}

#[derive(Clone)]
struct SearchState {
    current_stop: StopId,
    current_time: Time,
    path: Vec<Leg>,
    transfers_used: usize,
}

struct QueueEntry {
    transfers_used: usize,
    distance: OrderedFloat<f64>,
    sequence: u64,
    state: SearchState,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.transfers_used == other.transfers_used
            && self.distance == other.distance
            && self.sequence == other.sequence
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // `BinaryHeap` is a max-heap; every comparison is reversed so the
    // frontier behaves as a min-heap over (transfers, distance), with
    // insertion order as a stable tie-break (spec §5 "Ordering guarantees").
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .transfers_used
            .cmp(&self.transfers_used)
            .then_with(|| other.distance.cmp(&self.distance))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Records a reachable target as the new best candidate when it improves
/// on `best` per spec §4.G rule (1). Returns whether the search should
/// terminate immediately (a 0-transfer solution, or a "good enough"
/// target within [`GOOD_ENOUGH_DISTANCE_KM`]).
fn evaluate_candidate(
    best: &mut Option<Journey>,
    path: &[Leg],
    transfers_used: usize,
    stop_distance: f64,
) -> bool {
    let improves = match best {
        None => true,
        Some(b) => {
            transfers_used < b.transfers()
                || (transfers_used == b.transfers() && stop_distance < b.final_distance_km)
        }
    };
    if improves {
        *best = Some(Journey {
            walk: None,
            legs: path.to_vec(),
            final_distance_km: stop_distance,
        });
    }
    transfers_used == 0 || stop_distance < GOOD_ENOUGH_DISTANCE_KM
}

/// Explores journeys from `source` up to `max_transfers` transfers,
/// ordered best-first by (transfers, distance-to-destination) (spec
/// §4.G). `targets` is the target stop set, each tagged with its
/// precomputed distance (km) to the geocoded destination.
#[allow(clippy::too_many_arguments)]
pub fn best_first_search(
    feed: &FeedStore,
    index: &TripIndex,
    valid: &ValidTrips,
    source: &str,
    destination: Point<f64>,
    targets: &[(StopId, f64)],
    earliest_departure: Time,
    max_transfers: usize,
    deadline: Option<Instant>,
) -> SearchOutcome {
    let target_distance: HashMap<&str, f64> =
        targets.iter().map(|(id, d)| (id.as_str(), *d)).collect();

    let distance_of = |stop_id: &str| -> f64 {
        if let Some(&d) = target_distance.get(stop_id) {
            return d;
        }
        feed.stop(stop_id)
            .and_then(|s| s.geometry)
            .map(|g| haversine_km(g, destination))
            .unwrap_or(f64::MAX)
    };

    let mut best: Option<Journey> = None;
    let mut visited: HashMap<StopId, usize> = HashMap::new();
    let mut heap: BinaryHeap<QueueEntry> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    heap.push(QueueEntry {
        transfers_used: 0,
        distance: OrderedFloat(distance_of(source)),
        sequence,
        state: SearchState {
            current_stop: source.to_string(),
            current_time: earliest_departure,
            path: Vec::new(),
            transfers_used: 0,
        },
    });
    sequence += 1;

    let mut iterations = 0usize;
    let mut iteration_cap_hit = false;
    let mut timed_out = false;

    while let Some(entry) = heap.pop() {
        iterations += 1;
        if iterations > ITERATION_CAP {
            iteration_cap_hit = true;
            log::warn!(
                "best-first search hit the iteration cap ({ITERATION_CAP}); \
                 returning the best candidate seen so far"
            );
            break;
        }
        if iterations % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    timed_out = true;
                    log::warn!("best-first search exceeded its wall-clock budget");
                    break;
                }
            }
        }

        let state = entry.state;

        match visited.get(state.current_stop.as_str()) {
            Some(&seen) if state.transfers_used > seen => continue,
            _ => {
                visited.insert(state.current_stop.clone(), state.transfers_used);
            }
        }

        // Rule (1): a popped state already sitting on a target is a
        // candidate solution.
        if target_distance.contains_key(state.current_stop.as_str()) {
            let stop_distance = distance_of(&state.current_stop);
            if evaluate_candidate(&mut best, &state.path, state.transfers_used, stop_distance) {
                return SearchOutcome {
                    journey: best,
                    iteration_cap_hit: false,
                    timed_out: false,
                };
            }
        }

        // Rule (2): a 0-transfer solution can't be beaten by exploring
        // transfer paths.
        if best.as_ref().is_some_and(|b| b.transfers() == 0) {
            continue;
        }

        // Rule (3).
        let t_next = if state.path.is_empty() {
            state.current_time
        } else {
            state.current_time + TRANSFER_BUFFER_SECS
        };

        // Rule (4).
        for connection in expand_connections(index, valid, &state.current_stop, t_next) {
            let is_transfer = !state.path.is_empty() && {
                let last = state.path.last().expect("checked non-empty above");
                (last.trip_id.as_str(), last.route_id.as_str())
                    != (connection.trip_id.as_str(), connection.route_id.as_str())
            };
            let new_transfers = state.transfers_used + usize::from(is_transfer);
            if new_transfers > max_transfers {
                continue;
            }

            let mut new_path = state.path.clone();
            new_path.push(Leg {
                from_stop: state.current_stop.clone(),
                to_stop: connection.next_stop.clone(),
                trip_id: connection.trip_id.clone(),
                route_id: connection.route_id.clone(),
                headsign: connection.headsign.clone(),
                departure_time: connection.departure_time_from_source,
                arrival_time: connection.arrival_time,
            });

            if target_distance.contains_key(connection.next_stop.as_str()) {
                let stop_distance = distance_of(&connection.next_stop);
                if evaluate_candidate(&mut best, &new_path, new_transfers, stop_distance) {
                    return SearchOutcome {
                        journey: best,
                        iteration_cap_hit: false,
                        timed_out: false,
                    };
                }
                continue;
            }

            let next_distance = distance_of(&connection.next_stop);
            heap.push(QueueEntry {
                transfers_used: new_transfers,
                distance: OrderedFloat(next_distance),
                sequence,
                state: SearchState {
                    current_stop: connection.next_stop,
                    current_time: connection.arrival_time,
                    path: new_path,
                    transfers_used: new_transfers,
                },
            });
            sequence += 1;
        }
    }

    SearchOutcome {
        journey: best,
        iteration_cap_hit,
        timed_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_day::compute_valid_trips;
    use crate::test_support::{
        sample_feed, sample_feed_without_direct_trip, scenario_monday,
    };

    fn destination() -> Point<f64> {
        Point::new(0.021, 0.0) // (lon, lat)
    }

    #[test]
    fn e1_direct_journey_has_zero_transfers() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);
        let targets = vec![("S3".to_string(), 0.11)];

        let outcome = best_first_search(
            &feed,
            &index,
            &valid,
            "S1",
            destination(),
            &targets,
            7 * 3600 + 30 * 60,
            2,
            None,
        );

        let journey = outcome.journey.expect("expected a journey");
        assert_eq!(journey.transfers(), 0);
        assert_eq!(journey.legs.len(), 1);
        assert_eq!(journey.legs[0].trip_id, "T1");
        assert_eq!(journey.total_minutes(), 20);
    }

    #[test]
    fn e3_transfer_journey_respects_buffer() {
        let feed = sample_feed_without_direct_trip();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);
        let targets = vec![("S3".to_string(), 0.11)];

        let outcome = best_first_search(
            &feed,
            &index,
            &valid,
            "S1",
            destination(),
            &targets,
            7 * 3600 + 30 * 60,
            2,
            None,
        );

        let journey = outcome.journey.expect("expected a journey");
        assert_eq!(journey.transfers(), 1);
        assert_eq!(journey.legs[0].trip_id, "T1");
        assert_eq!(journey.legs[1].trip_id, "T2");
        assert!(journey.is_valid());
    }

    #[test]
    fn e6_source_is_target_yields_empty_leg_journey() {
        let feed = sample_feed();
        let valid = compute_valid_trips(&feed, scenario_monday(), None);
        let index = TripIndex::build(&feed, &valid);
        // S1 itself counts as a (distant) target.
        let targets = vec![("S1".to_string(), 2.3), ("S3".to_string(), 0.11)];

        let outcome = best_first_search(
            &feed,
            &index,
            &valid,
            "S1",
            destination(),
            &targets,
            7 * 3600 + 30 * 60,
            0,
            None,
        );

        let journey = outcome.journey.expect("expected a journey");
        assert!(journey.legs.is_empty());
        assert_eq!(journey.final_distance_km, 2.3);
    }
}
