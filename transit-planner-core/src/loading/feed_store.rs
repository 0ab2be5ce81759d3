//! Component A — Feed Store: immutable in-memory GTFS tables.

use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::model::{
    CalendarEntry, CalendarException, ExceptionType, Route, RouteId, ServiceId, Stop, StopId,
    StopTime, Trip, TripId,
};
use crate::trip_index::TripIndexCache;

/// Holds parsed GTFS tables as immutable in-memory structures (spec §4.A).
/// Built once per process (or once per feed reload); all query-time
/// components (Service-Day Filter, Trip Index, Geo Index, ...) borrow
/// from it rather than own a copy.
#[derive(Debug)]
pub struct FeedStore {
    stops: Vec<Stop>,
    stops_by_id: HashMap<StopId, usize>,
    routes: Vec<Route>,
    routes_by_id: HashMap<RouteId, usize>,
    calendar: Vec<CalendarEntry>,
    calendar_by_service: HashMap<ServiceId, usize>,
    calendar_exceptions: HashMap<ServiceId, Vec<CalendarException>>,
    trips: Vec<Trip>,
    trips_by_id: HashMap<TripId, usize>,
    stop_times: Vec<StopTime>,
    /// Explicit walking transfer times from `transfers.txt`, keyed
    /// `(from_stop_id, to_stop_id)`, in seconds.
    transfer_times: HashMap<(StopId, StopId), u32>,
    /// Memoizes `(ValidTrips, TripIndex)` by `(date, route_type)` across
    /// repeated queries against this feed (spec §3 Lifecycle).
    trip_index_cache: TripIndexCache,
}

impl Clone for FeedStore {
    // `TripIndexCache` isn't cloned: a cloned `FeedStore` starts with a
    // cold cache rather than sharing one built against a distinct value.
    fn clone(&self) -> Self {
        FeedStore {
            stops: self.stops.clone(),
            stops_by_id: self.stops_by_id.clone(),
            routes: self.routes.clone(),
            routes_by_id: self.routes_by_id.clone(),
            calendar: self.calendar.clone(),
            calendar_by_service: self.calendar_by_service.clone(),
            calendar_exceptions: self.calendar_exceptions.clone(),
            trips: self.trips.clone(),
            trips_by_id: self.trips_by_id.clone(),
            stop_times: self.stop_times.clone(),
            transfer_times: self.transfer_times.clone(),
            trip_index_cache: TripIndexCache::new(),
        }
    }
}

impl FeedStore {
    pub(crate) fn new(
        stops: Vec<Stop>,
        routes: Vec<Route>,
        calendar: Vec<CalendarEntry>,
        calendar_exceptions: Vec<CalendarException>,
        trips: Vec<Trip>,
        stop_times: Vec<StopTime>,
        transfer_times: HashMap<(StopId, StopId), u32>,
    ) -> Self {
        let stops_by_id = stops
            .iter()
            .enumerate()
            .map(|(i, s)| (s.stop_id.clone(), i))
            .collect();
        let routes_by_id = routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.route_id.clone(), i))
            .collect();
        let calendar_by_service = calendar
            .iter()
            .enumerate()
            .map(|(i, c)| (c.service_id.clone(), i))
            .collect();
        let trips_by_id = trips
            .iter()
            .enumerate()
            .map(|(i, t)| (t.trip_id.clone(), i))
            .collect();

        let mut exceptions_by_service: HashMap<ServiceId, Vec<CalendarException>> =
            HashMap::new();
        for exception in calendar_exceptions {
            exceptions_by_service
                .entry(exception.service_id.clone())
                .or_default()
                .push(exception);
        }

        FeedStore {
            stops,
            stops_by_id,
            routes,
            routes_by_id,
            calendar,
            calendar_by_service,
            calendar_exceptions: exceptions_by_service,
            trips,
            trips_by_id,
            stop_times,
            transfer_times,
            trip_index_cache: TripIndexCache::new(),
        }
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops_by_id.get(stop_id).map(|&i| &self.stops[i])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, route_id: &str) -> Option<&Route> {
        self.routes_by_id.get(route_id).map(|&i| &self.routes[i])
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trips_by_id.get(trip_id).map(|&i| &self.trips[i])
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    /// The `(date, route_type)`-keyed `ValidTrips`/`TripIndex` cache for
    /// this feed (spec §3 Lifecycle).
    pub fn trip_index_cache(&self) -> &TripIndexCache {
        &self.trip_index_cache
    }

    /// Explicit walk time between two stops from `transfers.txt`, if the
    /// feed supplied one (spec §4.H supplement).
    pub fn explicit_transfer_seconds(&self, from: &str, to: &str) -> Option<u32> {
        self.transfer_times
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    /// Whether `service_id` is active on `date` (component B's core rule,
    /// spec §3/§4.B): the weekly calendar pattern, overridden by any
    /// `calendar_dates.txt` exception for that exact date.
    pub fn is_service_active(&self, service_id: &str, date: NaiveDate) -> bool {
        let base_active = self
            .calendar_by_service
            .get(service_id)
            .map(|&i| self.calendar[i].active_on(date))
            .unwrap_or(false);

        if let Some(exceptions) = self.calendar_exceptions.get(service_id) {
            if let Some(exception) = exceptions.iter().find(|e| e.date == date) {
                return exception.exception_type == ExceptionType::Added;
            }
        }

        base_active
    }
}
