//! Real-time overlay: live trip updates laid over upcoming static stop times.

use crate::gtfs::{Route, StopTime};
use crate::realtime::types::TripUpdate;
use crate::resolver::time_window::{ServiceMoment, classify_secs, format_clock};
use chrono_tz::Tz;
use std::collections::HashMap;

/// A static stop time that runs today, joined to its route.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub stop_time: &'a StopTime,
    pub route: &'a Route,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveTime {
    /// Seconds past midnight of the service day.
    pub secs: i64,
    pub clock: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub route_id: String,
    pub route_name: String,
    pub time: EffectiveTime,
    pub is_real_time: bool,
}

impl Arrival {
    /// "5 mins", or "5 mins (s)" when only the schedule backs it.
    pub fn describe(&self, now: &ServiceMoment) -> String {
        let when = classify_secs(now.secs as i64, self.time.secs, &self.time.clock);
        if self.is_real_time {
            when
        } else {
            format!("{} (s)", when)
        }
    }
}

/// Trip updates keyed by trip id; the first update for a trip wins.
pub struct LiveIndex<'a> {
    by_trip: HashMap<&'a str, &'a TripUpdate>,
}

impl<'a> LiveIndex<'a> {
    pub fn new(updates: &'a [TripUpdate]) -> Self {
        let mut by_trip = HashMap::new();
        for update in updates {
            if let Some(trip_id) = update.trip_id() {
                by_trip.entry(trip_id).or_insert(update);
            }
        }
        Self { by_trip }
    }

    /// The live arrival of this stop time's trip at this stop, if the feed has one.
    pub fn arrival_for(
        &self,
        stop_time: &StopTime,
        now: &ServiceMoment,
        timezone: Tz,
    ) -> Option<EffectiveTime> {
        let update = self.by_trip.get(stop_time.trip_id.as_str())?;
        let stu = update.update_for_stop(&stop_time.stop_id)?;

        let event = [stu.arrival.as_ref(), stu.departure.as_ref()]
            .into_iter()
            .flatten()
            .find(|event| event.time.is_some() || event.delay.is_some())?;

        if let Some(epoch) = event.time {
            let (secs, clock) = now.locate_epoch(epoch, timezone)?;
            return Some(EffectiveTime { secs, clock });
        }

        let secs = stop_time.arrival_time_secs? as i64 + event.delay?;
        Some(EffectiveTime {
            secs,
            clock: format_clock(secs),
        })
    }
}

fn resolve(
    candidate: &Candidate<'_>,
    live: &LiveIndex<'_>,
    now: &ServiceMoment,
    timezone: Tz,
) -> Option<Arrival> {
    let (time, is_real_time) = match live.arrival_for(candidate.stop_time, now, timezone) {
        Some(time) => (time, true),
        None => (
            EffectiveTime {
                secs: candidate.stop_time.arrival_time_secs? as i64,
                clock: candidate.stop_time.arrival_time.clone(),
            },
            false,
        ),
    };

    Some(Arrival {
        route_id: candidate.route.route_id.clone(),
        route_name: candidate.route.display_name(),
        time,
        is_real_time,
    })
}

/// One arrival per route, routes in order of first appearance.
///
/// A live arrival always takes the route's slot. A scheduled one takes it only
/// from an earlier scheduled arrival that is later than itself.
pub fn next_arrival_by_route(
    candidates: &[Candidate<'_>],
    live: &LiveIndex<'_>,
    now: &ServiceMoment,
    timezone: Tz,
) -> Vec<Arrival> {
    let mut slot_by_route: HashMap<String, usize> = HashMap::new();
    let mut arrivals: Vec<Arrival> = Vec::new();

    for candidate in candidates {
        let Some(arrival) = resolve(candidate, live, now, timezone) else {
            continue;
        };

        match slot_by_route.get(&arrival.route_id) {
            Some(&slot) => {
                let current = &arrivals[slot];
                let replace = arrival.is_real_time
                    || (!current.is_real_time && arrival.time.secs < current.time.secs);
                if replace {
                    arrivals[slot] = arrival;
                }
            }
            None => {
                slot_by_route.insert(arrival.route_id.clone(), arrivals.len());
                arrivals.push(arrival);
            }
        }
    }

    arrivals
}

/// Soonest arrivals of a single route, live where available.
pub fn soonest_arrivals(
    candidates: &[Candidate<'_>],
    live: &LiveIndex<'_>,
    now: &ServiceMoment,
    timezone: Tz,
    limit: usize,
) -> Vec<Arrival> {
    let mut arrivals: Vec<Arrival> = candidates
        .iter()
        .filter_map(|candidate| resolve(candidate, live, now, timezone))
        .collect();

    arrivals.sort_by_key(|arrival| arrival.time.secs);
    arrivals.truncate(limit);
    arrivals
}
