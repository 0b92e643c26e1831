use thiserror::Error;

/// Failures a rider can see. The `Display` text is the whole reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No stop found with that id.")]
    StopNotFound,

    #[error("No route found with that id.")]
    RouteNotFound,
}

/// The static dataset contradicts itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Trip {trip_id:?} references service {service_id:?} which has no calendar entry")]
    MissingCalendar { trip_id: String, service_id: String },
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed JSON feed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed protobuf feed: {0}")]
    Protobuf(#[from] prost::DecodeError),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading GTFS: {0}")]
    Io(#[from] std::io::Error),

    #[error("GTFS archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("GTFS table is malformed: {0}")]
    Csv(#[from] csv::Error),

    #[error("GTFS download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GTFS table {0} is missing")]
    MissingTable(&'static str),
}
