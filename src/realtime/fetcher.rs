use crate::error::FeedError;
use crate::realtime::protobuf;
use crate::realtime::types::{Alert, FeedEntity, FeedEnvelope, TripUpdate};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedFormat {
    Json,
    Protobuf,
}

/// Where live data comes from. Every call is a fresh fetch; nothing is cached
/// between queries.
pub trait LiveFeedSource: Send + Sync {
    fn trip_updates(&self) -> impl Future<Output = Result<Vec<TripUpdate>, FeedError>> + Send;

    fn alerts(&self) -> impl Future<Output = Result<Vec<Alert>, FeedError>> + Send;
}

pub struct HttpFeedSource {
    client: reqwest::Client,
    trip_updates_url: Option<String>,
    alerts_url: Option<String>,
    format: FeedFormat,
}

impl HttpFeedSource {
    pub fn new(
        trip_updates_url: Option<String>,
        alerts_url: Option<String>,
        format: FeedFormat,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            trip_updates_url,
            alerts_url,
            format,
        })
    }

    async fn fetch_entities(&self, url: Option<&str>) -> Result<Vec<FeedEntity>, FeedError> {
        let Some(url) = url else {
            return Ok(Vec::new());
        };

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }
        let bytes = response.bytes().await?;

        let feed = match self.format {
            FeedFormat::Json => serde_json::from_slice::<FeedEnvelope>(&bytes)?,
            FeedFormat::Protobuf => protobuf::decode_feed(&bytes)?,
        };

        debug!(
            url,
            entities = feed.entity.len(),
            produced_at = ?feed.header.as_ref().and_then(|h| h.timestamp),
            "Fetched live feed"
        );

        Ok(feed.entity)
    }
}

impl LiveFeedSource for HttpFeedSource {
    async fn trip_updates(&self) -> Result<Vec<TripUpdate>, FeedError> {
        let entities = self.fetch_entities(self.trip_updates_url.as_deref()).await?;
        Ok(entities.into_iter().filter_map(|e| e.trip_update).collect())
    }

    async fn alerts(&self) -> Result<Vec<Alert>, FeedError> {
        let entities = self.fetch_entities(self.alerts_url.as_deref()).await?;
        Ok(entities.into_iter().filter_map(|e| e.alert).collect())
    }
}
