pub mod fetcher;
pub mod protobuf;
pub mod types;

pub use fetcher::{FeedFormat, HttpFeedSource, LiveFeedSource};
