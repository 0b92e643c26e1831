pub mod commands;

use crate::realtime::LiveFeedSource;
use crate::resolver::Dispatcher;
use chrono::Utc;
use commands::Command;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A chat line handed over by the radio transport.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub sender: String,
    pub text: String,
    #[serde(default)]
    pub channel: bool,
}

pub struct Bot<F> {
    dispatcher: Dispatcher<F>,
    queries_answered: AtomicU64,
}

impl<F: LiveFeedSource> Bot<F> {
    pub fn new(dispatcher: Dispatcher<F>) -> Self {
        Self {
            dispatcher,
            queries_answered: AtomicU64::new(0),
        }
    }

    /// The reply to send back, or `None` when the message is not a command.
    pub async fn handle_message(&self, message: &InboundMessage) -> Option<String> {
        let text = if message.channel {
            commands::strip_sender_prefix(&message.text)
        } else {
            message.text.as_str()
        };

        let command = commands::parse(text)?;
        info!(sender = %message.sender, channel = message.channel, ?command, "Answering command");

        let reply = self.execute(command).await;
        self.queries_answered.fetch_add(1, Ordering::Relaxed);
        Some(reply)
    }

    async fn execute(&self, command: Command) -> String {
        let result = match command {
            Command::Help(topic) => Ok(commands::help_text(topic.as_deref()).to_string()),
            Command::Info => Ok(commands::INFO.to_string()),
            Command::Beats => Ok(commands::swatch_beats(Utc::now())),
            Command::Stats => Ok(format!(
                "Queries answered: {}",
                self.queries_answered.load(Ordering::Relaxed)
            )),
            Command::Bus {
                stop_id,
                route: None,
            } => self.dispatcher.arrivals_for_stop(&stop_id).await,
            Command::Bus {
                stop_id,
                route: Some(route),
            } => {
                self.dispatcher
                    .arrivals_for_stop_and_route(&stop_id, &route)
                    .await
            }
            Command::Alerts {
                stop_id,
                route: None,
            } => self.dispatcher.alerts_for_stop(&stop_id).await,
            Command::Alerts {
                stop_id,
                route: Some(route),
            } => {
                self.dispatcher
                    .alerts_for_stop_and_route(&stop_id, &route)
                    .await
            }
        };

        result.unwrap_or_else(|e| e.to_string())
    }
}
