mod api;
mod bot;
mod config;
mod error;
mod gtfs;
mod realtime;
mod resolver;

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = config::Args::parse();

    info!(source = %args.gtfs, "Starting King County Metro mesh transit service");

    let gtfs_data = match gtfs::loader::load_gtfs(&args.gtfs).await {
        Ok(data) => {
            info!(
                stops = data.stops.len(),
                routes = data.routes.len(),
                trips = data.trips.len(),
                stop_times = data.stop_time_count(),
                "Loaded GTFS schedule"
            );
            Arc::new(data)
        }
        Err(e) => {
            error!(error = %e, "Failed to load GTFS data");
            return;
        }
    };

    if args.trip_updates_url.is_none() {
        info!("No trip updates feed configured, answering from the schedule only");
    }

    let feeds = match realtime::HttpFeedSource::new(
        args.trip_updates_url.clone(),
        args.alerts_url.clone(),
        args.feed_format,
        args.feed_timeout(),
    ) {
        Ok(feeds) => feeds,
        Err(e) => {
            error!(error = %e, "Failed to build live feed client");
            return;
        }
    };

    let dispatcher = resolver::Dispatcher::new(gtfs_data, feeds, args.core_config());
    let bot = Arc::new(bot::Bot::new(dispatcher));

    if let Err(e) = api::server::run_server(bot, args.port).await {
        error!(error = %e, "HTTP bridge exited");
    }
}
