use chrono::{DateTime, Timelike, Utc};

pub const HELP: &str = "Commands:\n• alerts\n• bus\n• info\n---\n• beats\n• stats";
pub const HELP_ALERTS: &str = "Use alerts [stop] or alerts [stop] [route] for alerts. Ex:\nalerts 11040\nalerts 1120 11\nalerts 120 G Line";
pub const HELP_BEATS: &str = "Returns the current time in .beats (Swatch Internet Time)";
pub const HELP_BUS: &str = "Use bus [stop] or bus [stop] [route] for scheduled arrivals. Ex:\nbus 11040\nbus 1120 11\nbus 120 G Line\nbus 1651 First Hill Streetcar";
pub const HELP_INFO: &str = "Transit scheduling, geographic, and real-time data provided by permission of King County.";
pub const HELP_STATS: &str = "Returns the number of queries answered since the service was started.";
pub const INFO: &str = HELP_INFO;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help(Option<String>),
    Info,
    Beats,
    Stats,
    Bus { stop_id: String, route: Option<String> },
    Alerts { stop_id: String, route: Option<String> },
}

/// Turns a chat line into a command. Anything that is not one yields `None`
/// and gets no reply.
pub fn parse(text: &str) -> Option<Command> {
    let cleaned = text.trim().to_lowercase();
    let (verb, rest) = match cleaned.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (cleaned.as_str(), ""),
    };

    let command = match verb {
        "help" if rest.is_empty() => Command::Help(None),
        "help" => Command::Help(Some(rest.to_string())),
        "info" => Command::Info,
        "beats" => Command::Beats,
        "stats" => Command::Stats,
        "bus" | "alerts" if rest.is_empty() => Command::Help(Some(verb.to_string())),
        "bus" | "alerts" => {
            let (stop_id, route) = match rest.split_once(' ') {
                Some((stop_id, route)) => (stop_id, Some(route.trim().to_string())),
                None => (rest, None),
            };
            let stop_id = stop_id.to_string();
            if verb == "bus" {
                Command::Bus { stop_id, route }
            } else {
                Command::Alerts { stop_id, route }
            }
        }
        _ => return None,
    };

    Some(command)
}

pub fn help_text(topic: Option<&str>) -> &'static str {
    match topic {
        Some("alerts") => HELP_ALERTS,
        Some("beats") => HELP_BEATS,
        Some("bus") => HELP_BUS,
        Some("info") => HELP_INFO,
        Some("stats") => HELP_STATS,
        _ => HELP,
    }
}

/// Channel lines arrive as "sender: text". Everything through the first colon
/// is the sender; the space after it is optional.
pub fn strip_sender_prefix(text: &str) -> &str {
    text.split_once(':')
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or(text)
}

/// Swatch Internet Time: the day in 1000 beats, on UTC+1 with no DST.
pub fn swatch_beats(now: DateTime<Utc>) -> String {
    let biel_secs = (now.num_seconds_from_midnight() + 3600) % 86_400;
    format!("@{:03}", biel_secs * 10 / 864)
}
