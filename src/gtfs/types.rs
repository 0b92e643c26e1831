use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: String,
}

/// `route_short_name` may arrive wrapped in literal quotes; compare through
/// [`canonical_route_name`], display through [`dequote`].
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: String,
}

impl Route {
    pub fn display_name(&self) -> String {
        dequote(&self.route_short_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEntry {
    pub service_id: String,
    pub sunday: String,
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    pub saturday: String,
}

#[derive(Debug, Clone)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub arrival_time: String,
    pub stop_sequence: u32,
    /// `None` for blank or malformed `arrival_time`; such rows are never upcoming.
    pub arrival_time_secs: Option<u32>,
}

impl StopTime {
    pub fn new(trip_id: String, stop_id: String, arrival_time: String, stop_sequence: u32) -> Self {
        let arrival_time_secs = parse_time_to_secs(&arrival_time);
        Self {
            trip_id,
            stop_id,
            arrival_time,
            stop_sequence,
            arrival_time_secs,
        }
    }
}

/// Seconds past midnight of the service day. Hours may exceed 23 for
/// post-midnight service.
pub fn parse_time_to_secs(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() >= 2 {
        let hours: u32 = parts[0].parse().ok()?;
        let mins: u32 = parts[1].parse().ok()?;
        let secs: u32 = match parts.get(2) {
            Some(s) => s.parse().ok()?,
            None => 0,
        };
        hours
            .checked_mul(3600)?
            .checked_add(mins.checked_mul(60)?)?
            .checked_add(secs)
    } else {
        None
    }
}

pub fn dequote(name: &str) -> String {
    name.replace('"', "")
}

pub fn canonical_route_name(name: &str) -> String {
    dequote(name).trim().to_lowercase()
}

/// Static Schedule Index. Built once at startup and shared read-only.
#[derive(Debug, Default)]
pub struct GtfsData {
    pub stops: HashMap<String, Stop>,
    pub routes: HashMap<String, Route>,
    pub trips: HashMap<String, Trip>,
    pub calendar: HashMap<String, CalendarEntry>,
    routes_by_name: HashMap<String, String>,
    trips_by_route: HashMap<String, Vec<String>>,
    stop_times_by_stop: HashMap<String, Vec<StopTime>>,
}

impl GtfsData {
    pub fn new(
        stops: Vec<Stop>,
        routes: Vec<Route>,
        trips: Vec<Trip>,
        calendar: Vec<CalendarEntry>,
        stop_times: Vec<StopTime>,
    ) -> Self {
        let mut data = GtfsData::default();

        for stop in stops {
            data.stops.entry(stop.stop_id.clone()).or_insert(stop);
        }

        // First route in table order wins a short-name collision.
        for route in routes {
            data.routes_by_name
                .entry(canonical_route_name(&route.route_short_name))
                .or_insert_with(|| route.route_id.clone());
            data.routes.entry(route.route_id.clone()).or_insert(route);
        }

        for trip in trips {
            data.trips_by_route
                .entry(trip.route_id.clone())
                .or_default()
                .push(trip.trip_id.clone());
            data.trips.insert(trip.trip_id.clone(), trip);
        }

        for entry in calendar {
            data.calendar.insert(entry.service_id.clone(), entry);
        }

        for stop_time in stop_times {
            data.stop_times_by_stop
                .entry(stop_time.stop_id.clone())
                .or_default()
                .push(stop_time);
        }

        data
    }

    pub fn get_stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.get(stop_id)
    }

    pub fn get_route(&self, route_id: &str) -> Option<&Route> {
        self.routes.get(route_id)
    }

    /// Case-insensitive, quote-insensitive lookup by rider-facing name.
    pub fn get_route_by_short_name(&self, short_name: &str) -> Option<&Route> {
        self.routes_by_name
            .get(&canonical_route_name(short_name))
            .and_then(|route_id| self.routes.get(route_id))
    }

    pub fn get_trip_by_id(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.get(trip_id)
    }

    pub fn get_trips_on_route(&self, route_id: &str) -> Vec<&Trip> {
        self.trips_by_route
            .get(route_id)
            .map(|ids| ids.iter().filter_map(|id| self.trips.get(id)).collect())
            .unwrap_or_default()
    }

    /// Stop times at a stop, in source table order.
    pub fn get_stop_times_at(&self, stop_id: &str) -> &[StopTime] {
        self.stop_times_by_stop
            .get(stop_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stop_time_count(&self) -> usize {
        self.stop_times_by_stop.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn stop(id: &str, name: &str) -> Stop {
        Stop {
            stop_id: id.to_string(),
            stop_name: name.to_string(),
        }
    }

    pub fn route(id: &str, short_name: &str) -> Route {
        Route {
            route_id: id.to_string(),
            route_short_name: short_name.to_string(),
        }
    }

    pub fn trip(id: &str, route_id: &str, service_id: &str) -> Trip {
        Trip {
            trip_id: id.to_string(),
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
        }
    }

    /// `days` is sunday..saturday, e.g. "0111110" for weekdays.
    pub fn calendar(service_id: &str, days: &str) -> CalendarEntry {
        let flag = |i: usize| days[i..i + 1].to_string();
        CalendarEntry {
            service_id: service_id.to_string(),
            sunday: flag(0),
            monday: flag(1),
            tuesday: flag(2),
            wednesday: flag(3),
            thursday: flag(4),
            friday: flag(5),
            saturday: flag(6),
        }
    }

    pub fn stop_time(trip_id: &str, stop_id: &str, arrival: &str, seq: u32) -> StopTime {
        StopTime::new(
            trip_id.to_string(),
            stop_id.to_string(),
            arrival.to_string(),
            seq,
        )
    }

    /// Stop 1120 served by routes 11 and 49 every day, and by the G Line on weekdays.
    pub fn sample_gtfs() -> GtfsData {
        GtfsData::new(
            vec![
                stop("1120", "E Pine St & 15th Ave"),
                stop("11040", "Broadway & E Pike St"),
            ],
            vec![
                route("100011", "\"11\""),
                route("100049", "\"49\""),
                route("102736", "\"G Line\""),
            ],
            vec![
                trip("t11a", "100011", "daily"),
                trip("t11b", "100011", "daily"),
                trip("t49a", "100049", "daily"),
                trip("tga", "102736", "weekday"),
            ],
            vec![calendar("daily", "1111111"), calendar("weekday", "0111110")],
            vec![
                stop_time("t11a", "1120", "08:20:00", 5),
                stop_time("t49a", "1120", "08:12:00", 3),
                stop_time("t11b", "1120", "08:10:00", 5),
                stop_time("tga", "1120", "09:45:00", 2),
                stop_time("t11a", "11040", "08:25:00", 6),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_parse_time_handles_post_midnight_hours() {
        assert_eq!(parse_time_to_secs("08:01:20"), Some(8 * 3600 + 80));
        assert_eq!(parse_time_to_secs("25:10:00"), Some(25 * 3600 + 600));
        assert_eq!(parse_time_to_secs(""), None);
        assert_eq!(parse_time_to_secs("8:xx:00"), None);
        assert_eq!(parse_time_to_secs("1193046:28:15"), Some(u32::MAX));
        assert_eq!(parse_time_to_secs("9999999:00:00"), None);
        assert_eq!(parse_time_to_secs("1193046:28:16"), None);
    }

    #[test]
    fn test_dequote_is_idempotent() {
        for name in ["\"G Line\"", "11", "\"\"", "E \"Line\""] {
            assert_eq!(dequote(&dequote(name)), dequote(name));
        }
        assert_eq!(dequote("\"G Line\""), "G Line");
    }

    #[test]
    fn test_route_lookup_ignores_case_and_quotes() {
        let gtfs = sample_gtfs();
        assert_eq!(
            gtfs.get_route_by_short_name("g line").map(|r| r.route_id.as_str()),
            Some("102736")
        );
        assert_eq!(
            gtfs.get_route_by_short_name("G LINE").map(|r| r.route_id.as_str()),
            Some("102736")
        );
        assert!(gtfs.get_route_by_short_name("h line").is_none());
    }

    #[test]
    fn test_stop_times_keep_table_order() {
        let gtfs = sample_gtfs();
        let trips: Vec<&str> = gtfs
            .get_stop_times_at("1120")
            .iter()
            .map(|st| st.trip_id.as_str())
            .collect();
        assert_eq!(trips, vec!["t11a", "t49a", "t11b", "tga"]);
        assert!(gtfs.get_stop_times_at("nope").is_empty());
    }

    #[test]
    fn test_trips_on_route() {
        let gtfs = sample_gtfs();
        let ids: Vec<&str> = gtfs
            .get_trips_on_route("100011")
            .iter()
            .map(|t| t.trip_id.as_str())
            .collect();
        assert_eq!(ids, vec!["t11a", "t11b"]);
    }
}
