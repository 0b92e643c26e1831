use crate::error::FeedError;
use crate::realtime::types::{
    Alert, FeedEntity, FeedEnvelope, FeedHeader, InformedEntity, StopTimeEvent, StopTimeUpdate,
    TranslatedString, Translation, TripDescriptor, TripUpdate,
};
use prost::Message;

pub fn decode_feed(bytes: &[u8]) -> Result<FeedEnvelope, FeedError> {
    let feed = gtfs_realtime::FeedMessage::decode(bytes)?;

    Ok(FeedEnvelope {
        header: Some(FeedHeader {
            timestamp: feed.header.timestamp,
        }),
        entity: feed.entity.into_iter().map(convert_entity).collect(),
    })
}

fn convert_entity(entity: gtfs_realtime::FeedEntity) -> FeedEntity {
    FeedEntity {
        id: Some(entity.id),
        trip_update: entity.trip_update.map(convert_trip_update),
        alert: entity.alert.map(convert_alert),
    }
}

fn convert_trip_update(update: gtfs_realtime::TripUpdate) -> TripUpdate {
    TripUpdate {
        trip: TripDescriptor {
            trip_id: update.trip.trip_id,
            route_id: update.trip.route_id,
        },
        stop_time_update: update
            .stop_time_update
            .into_iter()
            .map(|stu| StopTimeUpdate {
                stop_id: stu.stop_id,
                arrival: stu.arrival.map(convert_event),
                departure: stu.departure.map(convert_event),
            })
            .collect(),
        timestamp: update.timestamp,
    }
}

fn convert_event(event: gtfs_realtime::trip_update::StopTimeEvent) -> StopTimeEvent {
    StopTimeEvent {
        time: event.time,
        delay: event.delay.map(i64::from),
    }
}

// The protobuf schema has no short_header_text; header_text carries the text.
fn convert_alert(alert: gtfs_realtime::Alert) -> Alert {
    Alert {
        effect: alert.effect.map(|code| {
            gtfs_realtime::alert::Effect::try_from(code)
                .map(|effect| effect.as_str_name().to_string())
                .unwrap_or_else(|_| code.to_string())
        }),
        severity: alert.severity_level.map(i64::from),
        informed_entity: alert
            .informed_entity
            .into_iter()
            .map(|selector| InformedEntity {
                agency_id: selector.agency_id,
                route_id: selector.route_id,
                stop_id: selector.stop_id,
                activities: Vec::new(),
            })
            .collect(),
        short_header_text: None,
        header_text: alert.header_text.map(|text| TranslatedString {
            translation: text
                .translation
                .into_iter()
                .map(|t| Translation {
                    text: t.text,
                    language: t.language,
                })
                .collect(),
        }),
    }
}
