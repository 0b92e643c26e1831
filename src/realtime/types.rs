//! Live feed entities as the resolver sees them.
//!
//! Field names follow GTFS-Realtime. The JSON rendering published by King
//! County Metro is read directly; protobuf feeds are converted into these types
//! by [`crate::realtime::protobuf`]. Numeric fields are accepted either as JSON
//! numbers or as strings, since both appear in the wild.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub header: Option<FeedHeader>,
    #[serde(default)]
    pub entity: Vec<FeedEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedHeader {
    #[serde(default, deserialize_with = "opt_u64")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedEntity {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub trip_update: Option<TripUpdate>,
    #[serde(default)]
    pub alert: Option<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripDescriptor {
    #[serde(default, deserialize_with = "opt_string")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripUpdate {
    #[serde(default)]
    pub trip: TripDescriptor,
    #[serde(default)]
    pub stop_time_update: Vec<StopTimeUpdate>,
    #[serde(default, deserialize_with = "opt_u64")]
    pub timestamp: Option<u64>,
}

impl TripUpdate {
    pub fn trip_id(&self) -> Option<&str> {
        self.trip.trip_id.as_deref()
    }

    pub fn update_for_stop(&self, stop_id: &str) -> Option<&StopTimeUpdate> {
        self.stop_time_update
            .iter()
            .find(|stu| stu.stop_id.as_deref() == Some(stop_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopTimeUpdate {
    #[serde(default, deserialize_with = "opt_string")]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub arrival: Option<StopTimeEvent>,
    #[serde(default)]
    pub departure: Option<StopTimeEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StopTimeEvent {
    /// Absolute POSIX time.
    #[serde(default, deserialize_with = "opt_i64")]
    pub time: Option<i64>,
    /// Seconds relative to the schedule.
    #[serde(default, deserialize_with = "opt_i64")]
    pub delay: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "opt_string")]
    pub effect: Option<String>,
    #[serde(default, deserialize_with = "opt_i64")]
    pub severity: Option<i64>,
    #[serde(default)]
    pub informed_entity: Vec<InformedEntity>,
    #[serde(default)]
    pub short_header_text: Option<TranslatedString>,
    #[serde(default)]
    pub header_text: Option<TranslatedString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InformedEntity {
    #[serde(default, deserialize_with = "opt_string")]
    pub agency_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub route_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslatedString {
    #[serde(default)]
    pub translation: Vec<Translation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

fn opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Int(i)) => Some(i),
        Some(NumberOrString::Float(f)) => Some(f as i64),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(opt_i64(deserializer)?.and_then(|v| u64::try_from(v).ok()))
}

fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Int(i)) => Some(i.to_string()),
        Some(NumberOrString::Float(f)) => Some(f.to_string()),
        Some(NumberOrString::Text(s)) => Some(s),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_trip_update_accepts_string_numbers() {
        let json = r#"{
            "header": {"gtfs_realtime_version": "2.0", "timestamp": "1792335600"},
            "entity": [{
                "id": "tu-1",
                "trip_update": {
                    "trip": {"trip_id": "t11a", "route_id": 100011},
                    "stop_time_update": [
                        {"stop_id": "1120", "arrival": {"time": "1792336020"}},
                        {"stop_id": 11040, "departure": {"delay": 90}}
                    ]
                }
            }]
        }"#;

        let feed: FeedEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(feed.header.unwrap().timestamp, Some(1_792_335_600));

        let update = feed.entity[0].trip_update.as_ref().unwrap();
        assert_eq!(update.trip_id(), Some("t11a"));
        assert_eq!(update.trip.route_id.as_deref(), Some("100011"));
        assert_eq!(
            update.update_for_stop("1120").unwrap().arrival,
            Some(StopTimeEvent {
                time: Some(1_792_336_020),
                delay: None
            })
        );
        assert_eq!(
            update.update_for_stop("11040").unwrap().departure.as_ref().unwrap().delay,
            Some(90)
        );
        assert!(update.update_for_stop("999").is_none());
    }

    #[test]
    fn test_json_alert_with_short_header() {
        let json = r#"{
            "entity": [{
                "id": "a1",
                "alert": {
                    "effect": "DETOUR",
                    "severity": 2,
                    "informed_entity": [{"agency_id": "1", "route_id": "100011", "stop_id": "1120", "activities": ["BOARD"]}],
                    "short_header_text": {"translation": [{"text": "Rt 11 detour", "language": "en"}]}
                }
            }]
        }"#;

        let feed: FeedEnvelope = serde_json::from_str(json).unwrap();
        let alert = feed.entity[0].alert.as_ref().unwrap();
        assert_eq!(alert.effect.as_deref(), Some("DETOUR"));
        assert_eq!(alert.informed_entity[0].activities, vec!["BOARD".to_string()]);
        assert_eq!(
            alert.short_header_text.as_ref().unwrap().translation[0].text,
            "Rt 11 detour"
        );
        assert!(alert.header_text.is_none());
    }
}
