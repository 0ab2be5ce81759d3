use chrono::{NaiveDate, Weekday};

/// Stable identifier for a service, as it appears in the GTFS `calendar`
/// table.
pub type ServiceId = String;

/// A row of `calendar.txt`: a weekly recurrence pattern bounded by an
/// inclusive date range (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub service_id: ServiceId,
    pub weekdays: [bool; 7],
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CalendarEntry {
    fn weekday_index(weekday: Weekday) -> usize {
        weekday.num_days_from_monday() as usize
    }

    /// Active on `date` iff the weekday bit is set and the date falls
    /// within `[start_date, end_date]`.
    pub fn active_on(&self, date: NaiveDate) -> bool {
        if date < self.start_date || date > self.end_date {
            return false;
        }
        self.weekdays[Self::weekday_index(date.weekday())]
    }
}

/// `exception_type` values from `calendar_dates.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Added,
    Removed,
}

/// A row of the optional `calendar_dates.txt` file: a single-date
/// override (add or remove) of a service's activeness. Honoring these is
/// the resolution of the open question in spec §9.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarException {
    pub service_id: ServiceId,
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
}
