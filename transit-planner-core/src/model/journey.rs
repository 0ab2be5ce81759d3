use super::route::RouteId;
use super::stop::StopId;
use super::trip::{Time, TripId};

pub const TRANSFER_BUFFER_SECS: Time = 5 * 60;

/// Walking speed assumed for the Walk-Fallback orchestrator (spec §4.H).
pub const WALK_SPEED_M_PER_MIN: f64 = 80.0;

/// One on-vehicle segment of a Journey: a single trip from one stop-time
/// to a strictly later stop-time on the same trip (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub headsign: String,
    pub departure_time: Time,
    pub arrival_time: Time,
}

/// A single leading walk, from the query's source stop to a nearby stop
/// (spec §3, §4.H).
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub distance_m: f64,
    pub duration_minutes: u32,
}

impl Walk {
    /// Duration in minutes, rounded up, at `WALK_SPEED_M_PER_MIN` (spec §4.H,
    /// §8 invariant 5).
    pub fn from_distance(from_stop: StopId, to_stop: StopId, distance_m: f64) -> Self {
        let duration_minutes = (distance_m / WALK_SPEED_M_PER_MIN).ceil() as u32;
        Walk {
            from_stop,
            to_stop,
            distance_m,
            duration_minutes,
        }
    }
}

/// A complete journey: zero or more transit legs, optionally preceded by
/// one walk (spec §3).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Journey {
    pub walk: Option<Walk>,
    pub legs: Vec<Leg>,
    /// Distance in km from the journey's final stop to the geocoded
    /// destination point.
    pub final_distance_km: f64,
}

impl Journey {
    pub fn transfers(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    /// Total elapsed minutes: walk duration (if any) plus the span from
    /// the first leg's departure to the last leg's arrival. A journey with
    /// no legs (source is already a target) and no walk has zero minutes.
    pub fn total_minutes(&self) -> u32 {
        let walk_minutes = self.walk.as_ref().map_or(0, |w| w.duration_minutes);
        let transit_minutes = match (self.legs.first(), self.legs.last()) {
            (Some(first), Some(last)) => {
                (last.arrival_time.saturating_sub(first.departure_time)) / 60
            }
            _ => 0,
        };
        walk_minutes + transit_minutes
    }

    /// Scoring rule used by the Walk-Fallback orchestrator to compare
    /// candidates across source stops (spec §4.H step 6).
    pub fn score(&self) -> u32 {
        self.total_minutes() + 30 * self.transfers() as u32
    }

    /// Validates the invariant in spec §3/§8#2: consecutive legs must
    /// differ in trip and respect the transfer buffer.
    pub fn is_valid(&self) -> bool {
        self.legs.windows(2).all(|pair| {
            let (l, l_next) = (&pair[0], &pair[1]);
            l_next.trip_id != l.trip_id
                && l_next.departure_time >= l.arrival_time + TRANSFER_BUFFER_SECS
        })
    }
}
