//! Data model for the transit journey planner.
//!
//! Mirrors spec §3: stops, routes, service calendars, trips, stop-times,
//! and the journey/leg/walk result types.

pub mod calendar;
pub mod journey;
pub mod route;
pub mod stop;
pub mod trip;

pub use calendar::{CalendarEntry, CalendarException, ExceptionType, ServiceId};
pub use journey::{Journey, Leg, Walk, TRANSFER_BUFFER_SECS, WALK_SPEED_M_PER_MIN};
pub use route::{Route, RouteId, RouteType};
pub use stop::{Stop, StopId};
pub use trip::{StopTime, Time, Trip, TripId};
