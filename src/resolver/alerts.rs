use crate::realtime::types::{Alert, InformedEntity, TranslatedString};
use tracing::debug;

const NO_ALERTS: &str = "No alerts.";

fn entity_matches(entity: &InformedEntity, stop_id: &str, route_id: Option<&str>) -> bool {
    if entity.stop_id.as_deref() != Some(stop_id) {
        return false;
    }
    match route_id {
        Some(route_id) => entity.route_id.as_deref() == Some(route_id),
        None => true,
    }
}

/// Alerts naming this stop, and this route in the same informed entity when a
/// route is given.
pub fn matching_alerts<'a>(
    alerts: &'a [Alert],
    stop_id: &str,
    route_id: Option<&str>,
) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|alert| {
            alert
                .informed_entity
                .iter()
                .any(|entity| entity_matches(entity, stop_id, route_id))
        })
        .collect()
}

/// The translation in `language`, else the first one.
fn pick_translation<'a>(text: &'a TranslatedString, language: &str) -> Option<&'a str> {
    text.translation
        .iter()
        .find(|t| t.language.as_deref() == Some(language))
        .or_else(|| text.translation.first())
        .map(|t| t.text.as_str())
}

pub fn select_text<'a>(alert: &'a Alert, language: &str) -> Option<&'a str> {
    [alert.short_header_text.as_ref(), alert.header_text.as_ref()]
        .into_iter()
        .flatten()
        .find(|text| !text.translation.is_empty())
        .and_then(|text| pick_translation(text, language))
}

/// Stop name, then one alert per line, or "No alerts.".
pub fn render_alerts(
    stop_name: &str,
    alerts: &[Alert],
    stop_id: &str,
    route_id: Option<&str>,
    language: &str,
) -> String {
    let mut reply = stop_name.to_string();
    let mut shown = 0;

    for alert in matching_alerts(alerts, stop_id, route_id) {
        match select_text(alert, language) {
            Some(text) => {
                reply.push('\n');
                reply.push_str(text);
                shown += 1;
            }
            None => debug!(stop_id, effect = ?alert.effect, "Matched alert has no text"),
        }
    }

    if shown == 0 {
        reply.push('\n');
        reply.push_str(NO_ALERTS);
    }
    reply
}
