use crate::error::QueryError;
use crate::gtfs::{GtfsData, Route, Stop};
use crate::realtime::LiveFeedSource;
use crate::realtime::types::{Alert, TripUpdate};
use crate::resolver::alerts::render_alerts;
use crate::resolver::overlay::{Candidate, LiveIndex, next_arrival_by_route, soonest_arrivals};
use crate::resolver::time_window::ServiceMoment;
use chrono_tz::Tz;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, warn};

const NO_UPCOMING_TRIPS: &str = "No upcoming trips.";
const ROUTE_ARRIVAL_LIMIT: usize = 5;

/// The only settings the resolver reads.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub language_code: String,
    pub timezone: Tz,
}

/// Answers stop and route queries from the static index plus whatever the live
/// feeds return at the moment of the query.
///
/// Stop and route validation only touches static data and always finishes
/// before any feed is fetched.
pub struct Dispatcher<F> {
    gtfs: Arc<GtfsData>,
    feeds: F,
    config: CoreConfig,
}

impl<F: LiveFeedSource> Dispatcher<F> {
    pub fn new(gtfs: Arc<GtfsData>, feeds: F, config: CoreConfig) -> Self {
        Self {
            gtfs,
            feeds,
            config,
        }
    }

    pub fn now(&self) -> ServiceMoment {
        ServiceMoment::now_in(self.config.timezone)
    }

    pub async fn arrivals_for_stop(&self, stop_id: &str) -> Result<String, QueryError> {
        self.arrivals_for_stop_at(stop_id, &self.now()).await
    }

    pub async fn arrivals_for_stop_and_route(
        &self,
        stop_id: &str,
        route_short_name: &str,
    ) -> Result<String, QueryError> {
        self.arrivals_for_stop_and_route_at(stop_id, route_short_name, &self.now())
            .await
    }

    /// Next arrival of every route serving the stop, one line per route.
    pub async fn arrivals_for_stop_at(
        &self,
        stop_id: &str,
        now: &ServiceMoment,
    ) -> Result<String, QueryError> {
        let stop = self.resolve_stop(stop_id)?;
        let candidates = self.upcoming_at(stop, None, now);

        let mut reply = stop.stop_name.clone();
        if candidates.is_empty() {
            reply.push('\n');
            reply.push_str(NO_UPCOMING_TRIPS);
            return Ok(reply);
        }

        let updates = self.live_trip_updates().await;
        let live = LiveIndex::new(&updates);

        for arrival in next_arrival_by_route(&candidates, &live, now, self.config.timezone) {
            reply.push_str(&format!("\n{} - {}", arrival.route_name, arrival.describe(now)));
        }
        Ok(reply)
    }

    /// Up to five upcoming arrivals of one route at the stop, soonest first.
    pub async fn arrivals_for_stop_and_route_at(
        &self,
        stop_id: &str,
        route_short_name: &str,
        now: &ServiceMoment,
    ) -> Result<String, QueryError> {
        let stop = self.resolve_stop(stop_id)?;
        let route = self.resolve_route(route_short_name)?;
        let candidates = self.upcoming_at(stop, Some(route), now);

        let mut reply = stop.stop_name.clone();
        if candidates.is_empty() {
            reply.push('\n');
            reply.push_str(NO_UPCOMING_TRIPS);
            return Ok(reply);
        }

        let updates = self.live_trip_updates().await;
        let live = LiveIndex::new(&updates);

        for arrival in soonest_arrivals(
            &candidates,
            &live,
            now,
            self.config.timezone,
            ROUTE_ARRIVAL_LIMIT,
        ) {
            reply.push('\n');
            reply.push_str(&arrival.describe(now));
        }
        Ok(reply)
    }

    pub async fn alerts_for_stop(&self, stop_id: &str) -> Result<String, QueryError> {
        let stop = self.resolve_stop(stop_id)?;
        let alerts = self.live_alerts().await;

        Ok(render_alerts(
            &stop.stop_name,
            &alerts,
            &stop.stop_id,
            None,
            &self.config.language_code,
        ))
    }

    pub async fn alerts_for_stop_and_route(
        &self,
        stop_id: &str,
        route_short_name: &str,
    ) -> Result<String, QueryError> {
        let stop = self.resolve_stop(stop_id)?;
        let route = self.resolve_route(route_short_name)?;
        let alerts = self.live_alerts().await;

        Ok(render_alerts(
            &stop.stop_name,
            &alerts,
            &stop.stop_id,
            Some(&route.route_id),
            &self.config.language_code,
        ))
    }

    fn resolve_stop(&self, stop_id: &str) -> Result<&Stop, QueryError> {
        self.gtfs.get_stop(stop_id).ok_or(QueryError::StopNotFound)
    }

    fn resolve_route(&self, route_short_name: &str) -> Result<&Route, QueryError> {
        self.gtfs
            .get_route_by_short_name(route_short_name)
            .ok_or(QueryError::RouteNotFound)
    }

    /// Stop times at `stop` no earlier than `now` whose trip runs today,
    /// optionally restricted to one route. Trips with broken references are
    /// logged and skipped.
    fn upcoming_at<'a>(
        &'a self,
        stop: &Stop,
        route: Option<&Route>,
        now: &ServiceMoment,
    ) -> Vec<Candidate<'a>> {
        let route_trips: Option<HashSet<&str>> = route.map(|route| {
            self.gtfs
                .get_trips_on_route(&route.route_id)
                .into_iter()
                .map(|trip| trip.trip_id.as_str())
                .collect()
        });
        let mut candidates = Vec::new();

        for stop_time in self.gtfs.get_stop_times_at(&stop.stop_id) {
            match stop_time.arrival_time_secs {
                Some(secs) if secs >= now.secs => {}
                _ => continue,
            }

            if let Some(route_trips) = &route_trips {
                if !route_trips.contains(stop_time.trip_id.as_str()) {
                    continue;
                }
            }

            let Some(trip) = self.gtfs.get_trip_by_id(&stop_time.trip_id) else {
                error!(trip_id = %stop_time.trip_id, stop_id = %stop.stop_id, "Stop time references unknown trip");
                continue;
            };

            match self.gtfs.trip_runs_on(trip, now.weekday) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    error!(error = %e, "Skipping trip with broken service calendar");
                    continue;
                }
            }

            let Some(trip_route) = self.gtfs.get_route(&trip.route_id) else {
                error!(trip_id = %trip.trip_id, route_id = %trip.route_id, "Trip references unknown route");
                continue;
            };

            candidates.push(Candidate {
                stop_time,
                route: trip_route,
            });
        }

        candidates
    }

    async fn live_trip_updates(&self) -> Vec<TripUpdate> {
        match self.feeds.trip_updates().await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "Trip updates unavailable, answering from schedule");
                Vec::new()
            }
        }
    }

    async fn live_alerts(&self) -> Vec<Alert> {
        match self.feeds.alerts().await {
            Ok(alerts) => alerts,
            Err(e) => {
                warn!(error = %e, "Service alerts unavailable");
                Vec::new()
            }
        }
    }
}
