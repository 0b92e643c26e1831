use crate::error::LoadError;
use crate::gtfs::{CalendarEntry, GtfsData, Route, Stop, StopTime, Trip};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    #[serde(default)]
    arrival_time: String,
    stop_sequence: u32,
}

/// Loads the static tables from a directory of `.txt` files, a zip on disk,
/// or a zip behind an `http(s)` URL.
pub async fn load_gtfs(source: &str) -> Result<GtfsData, LoadError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        info!(url = source, "Downloading GTFS");

        let response = reqwest::get(source).await?.error_for_status()?;
        let bytes = response.bytes().await?;

        info!(bytes = bytes.len(), "Downloaded GTFS, extracting");
        return load_from_zip(bytes.to_vec());
    }

    let path = Path::new(source);
    if path.is_dir() {
        info!(dir = %path.display(), "Reading GTFS directory");
        build_gtfs(&mut DirTables(path.to_path_buf()))
    } else {
        info!(file = %path.display(), "Reading GTFS archive");
        let bytes = tokio::fs::read(path).await?;
        load_from_zip(bytes)
    }
}

pub fn load_from_zip(bytes: Vec<u8>) -> Result<GtfsData, LoadError> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    build_gtfs(&mut ZipTables(archive))
}

trait TableSource {
    fn read_table(&mut self, name: &'static str) -> Result<String, LoadError>;
}

struct DirTables(PathBuf);

impl TableSource for DirTables {
    fn read_table(&mut self, name: &'static str) -> Result<String, LoadError> {
        match std::fs::read_to_string(self.0.join(name)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::MissingTable(name)),
            Err(e) => Err(e.into()),
        }
    }
}

struct ZipTables(zip::ZipArchive<Cursor<Vec<u8>>>);

impl TableSource for ZipTables {
    fn read_table(&mut self, name: &'static str) -> Result<String, LoadError> {
        let mut file = match self.0.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Err(LoadError::MissingTable(name)),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        Ok(content)
    }
}

fn build_gtfs(source: &mut impl TableSource) -> Result<GtfsData, LoadError> {
    let stops: Vec<Stop> = parse_table(&source.read_table("stops.txt")?)?;
    let routes: Vec<Route> = parse_table(&source.read_table("routes.txt")?)?;
    let trips: Vec<Trip> = parse_table(&source.read_table("trips.txt")?)?;
    let calendar: Vec<CalendarEntry> = parse_table(&source.read_table("calendar.txt")?)?;
    let stop_times: Vec<StopTime> = parse_table::<StopTimeRow>(&source.read_table("stop_times.txt")?)?
        .into_iter()
        .map(|row| StopTime::new(row.trip_id, row.stop_id, row.arrival_time, row.stop_sequence))
        .collect();

    info!(
        stops = stops.len(),
        routes = routes.len(),
        trips = trips.len(),
        services = calendar.len(),
        stop_times = stop_times.len(),
        "Parsed GTFS tables"
    );

    Ok(GtfsData::new(stops, routes, trips, calendar, stop_times))
}

fn parse_table<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
