use crate::realtime::FeedFormat;
use crate::resolver::CoreConfig;
use chrono_tz::Tz;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "metro-mesh-transit")]
#[command(about = "King County Metro arrivals and alerts for mesh-radio chat")]
pub struct Args {
    /// Port of the HTTP bridge the radio transport posts messages to
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// GTFS directory, zip file, or zip URL
    #[arg(long, env = "GTFS_SOURCE", default_value = "./metro/gtfs")]
    pub gtfs: String,

    /// GTFS-Realtime trip updates feed
    #[arg(long, env = "METRO_GTFS_RT_TRIP_UPDATES_FEED")]
    pub trip_updates_url: Option<String>,

    /// GTFS-Realtime service alerts feed
    #[arg(long, env = "METRO_GTFS_RT_SERVICE_ALERTS_FEED")]
    pub alerts_url: Option<String>,

    #[arg(long, env = "FEED_FORMAT", value_enum, default_value = "json")]
    pub feed_format: FeedFormat,

    /// Preferred alert translation
    #[arg(long, env = "LANGUAGE_CODE", default_value = "en")]
    pub language_code: String,

    /// Wall clock the schedule is written in
    #[arg(long, env = "AGENCY_TIMEZONE", default_value = "America/Los_Angeles", value_parser = parse_timezone)]
    pub timezone: Tz,

    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value = "10")]
    pub feed_timeout_secs: u64,
}

fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|_| format!("unknown timezone {:?}", name))
}

impl Args {
    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            language_code: self.language_code.clone(),
            timezone: self.timezone,
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}
