use crate::gtfs::parse_time_to_secs;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

const NOW_WINDOW_SECS: i64 = 75;
const ONE_MINUTE_WINDOW_SECS: i64 = 120;
const MINUTES_WINDOW_SECS: i64 = 60 * 60;

/// Renders how far `target` is from `current`, both `HH:MM:SS`.
///
/// A target that is already behind `current` reads as "now"; callers pass only
/// upcoming times. Unparsable input yields `target` unchanged.
#[cfg_attr(not(test), allow(dead_code))]
pub fn classify(current: &str, target: &str) -> String {
    match (parse_time_to_secs(current), parse_time_to_secs(target)) {
        (Some(current_secs), Some(target_secs)) => {
            classify_secs(current_secs as i64, target_secs as i64, target)
        }
        _ => target.to_string(),
    }
}

pub fn classify_secs(current_secs: i64, target_secs: i64, target_clock: &str) -> String {
    let delta = target_secs - current_secs;

    if delta < NOW_WINDOW_SECS {
        "now".to_string()
    } else if delta < ONE_MINUTE_WINDOW_SECS {
        "1 min".to_string()
    } else if delta < MINUTES_WINDOW_SECS {
        format!("{} mins", delta / 60)
    } else {
        target_clock.to_string()
    }
}

/// `HH:MM:SS`, with hours past 23 kept as-is the way GTFS writes them.
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// The wall-clock instant a query is answered at, in the agency's timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMoment {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub secs: u32,
    pub clock: String,
}

impl ServiceMoment {
    pub fn from_datetime(local: &DateTime<Tz>) -> Self {
        Self {
            date: local.date_naive(),
            weekday: local.weekday(),
            secs: local.num_seconds_from_midnight(),
            clock: local.format("%H:%M:%S").to_string(),
        }
    }

    pub fn now_in(timezone: Tz) -> Self {
        Self::from_datetime(&Utc::now().with_timezone(&timezone))
    }

    /// Places a POSIX time on this service day: seconds past its midnight plus
    /// the local wall clock to display.
    pub fn locate_epoch(&self, epoch: i64, timezone: Tz) -> Option<(i64, String)> {
        let local = timezone.timestamp_opt(epoch, 0).single()?;
        let days = (local.date_naive() - self.date).num_days();
        let secs = days * 86_400 + local.num_seconds_from_midnight() as i64;
        Some((secs, local.format("%H:%M:%S").to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_classify_buckets() {
        assert_eq!(classify("08:00:00", "08:00:00"), "now");
        assert_eq!(classify("08:00:00", "08:01:00"), "now");
        assert_eq!(classify("08:00:00", "08:01:14"), "now");
        assert_eq!(classify("08:00:00", "08:01:15"), "1 min");
        assert_eq!(classify("08:00:00", "08:01:20"), "1 min");
        assert_eq!(classify("08:00:00", "08:02:00"), "2 mins");
        assert_eq!(classify("08:00:00", "08:30:00"), "30 mins");
        assert_eq!(classify("08:00:00", "08:59:59"), "59 mins");
        assert_eq!(classify("08:00:00", "09:00:00"), "09:00:00");
        assert_eq!(classify("08:00:00", "09:30:00"), "09:30:00");
    }

    #[test]
    fn test_classify_past_target_reads_now() {
        assert_eq!(classify("08:10:00", "08:00:00"), "now");
    }

    #[test]
    fn test_classify_post_midnight_service() {
        assert_eq!(classify("23:50:00", "24:05:00"), "15 mins");
        assert_eq!(classify("23:00:00", "25:10:00"), "25:10:00");
    }

    #[test]
    fn test_classify_never_goes_back_a_bucket() {
        fn bucket(s: &str) -> u8 {
            match s {
                "now" => 0,
                "1 min" => 1,
                s if s.ends_with(" mins") => 2,
                _ => 3,
            }
        }

        let mut last = 0;
        for delta in 0..(3 * 3600) {
            let target = format_clock(8 * 3600 + delta);
            let b = bucket(&classify("08:00:00", &target));
            assert!(b >= last, "bucket dropped at delta {}", delta);
            last = b;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(8 * 3600 + 7 * 60), "08:07:00");
        assert_eq!(format_clock(25 * 3600 + 61), "25:01:01");
    }

    #[test]
    fn test_locate_epoch_on_service_day() {
        let local = Los_Angeles.with_ymd_and_hms(2026, 10, 14, 23, 50, 0).unwrap();
        let moment = ServiceMoment::from_datetime(&local);
        assert_eq!(moment.weekday, Weekday::Wed);
        assert_eq!(moment.clock, "23:50:00");

        let later = Los_Angeles.with_ymd_and_hms(2026, 10, 15, 0, 5, 0).unwrap();
        let (secs, clock) = moment
            .locate_epoch(later.timestamp(), Los_Angeles)
            .unwrap();
        assert_eq!(secs, 24 * 3600 + 5 * 60);
        assert_eq!(clock, "00:05:00");
    }
}
