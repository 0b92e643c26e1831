//! Service-day filter: which trips run on a given weekday.

use crate::error::ScheduleError;
use crate::gtfs::{CalendarEntry, GtfsData, Trip};
use chrono::Weekday;

impl CalendarEntry {
    pub fn runs_on(&self, weekday: Weekday) -> bool {
        let flag = match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        };
        flag.trim() == "1"
    }
}

impl GtfsData {
    /// A trip whose `service_id` has no calendar entry is a data fault, not a
    /// trip that does not run.
    pub fn trip_runs_on(&self, trip: &Trip, weekday: Weekday) -> Result<bool, ScheduleError> {
        self.calendar
            .get(&trip.service_id)
            .map(|entry| entry.runs_on(weekday))
            .ok_or_else(|| ScheduleError::MissingCalendar {
                trip_id: trip.trip_id.clone(),
                service_id: trip.service_id.clone(),
            })
    }
}
