//! Schedule loading from the JSON route file.
//!
//! The source is a map from `city_<N>` keys to records of station name,
//! arrival time of day, stand duration, and departure time of day. Times
//! carry no date, so the loader threads a working calendar date through
//! the route and advances it whenever a parsed time precedes its
//! predecessor (midnight rollover). Malformed records are logged and
//! skipped; one bad record does not abort the whole schedule.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{StationInterval, first_ordering_violation, parse_hhmm, parse_stand_duration};

use super::reference::{distance_for, is_major_city, timezone_for};

/// Error from schedule loading.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Failed to read the schedule file.
    #[error("failed to read schedule: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid schedule JSON.
    #[error("failed to parse schedule JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No station record survived parsing.
    #[error("schedule contains no usable stations")]
    Empty,
}

/// One raw station record as it appears in the JSON source.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStation {
    pub name: String,
    #[serde(rename = "timeArrive")]
    pub time_arrive: String,
    pub stand: String,
    #[serde(rename = "timeDepart")]
    pub time_depart: String,
}

/// The loaded route: ordered stations plus metadata.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route display name.
    pub name: String,

    /// Departure instant from the origin.
    pub start: DateTime<Utc>,

    /// Total route length in kilometres.
    pub total_distance_km: u32,

    /// Stations ordered by visit, with the ordering invariant enforced.
    pub stations: Vec<Arc<StationInterval>>,
}

/// The Moscow-Khabarovsk route leaves Moscow on 2025-10-06 at 22:10 local.
fn route_start() -> DateTime<Utc> {
    Moscow
        .with_ymd_and_hms(2025, 10, 6, 22, 10, 0)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Load and build the route from a JSON schedule file.
pub fn load_route(path: impl AsRef<Path>) -> Result<Route, ScheduleError> {
    let contents = std::fs::read_to_string(path)?;
    let raw: HashMap<String, RawStation> = serde_json::from_str(&contents)?;
    build_route(raw)
}

/// Build the route from raw records.
pub fn build_route(raw: HashMap<String, RawStation>) -> Result<Route, ScheduleError> {
    let mut keyed: Vec<(String, RawStation)> = raw.into_iter().collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    // Numeric suffix of the key defines visit order.
    let mut ordered: Vec<(u32, RawStation)> = Vec::with_capacity(keyed.len());
    for (key, record) in keyed {
        match parse_city_number(&key) {
            Some(id) => ordered.push((id, record)),
            None => warn!(key, "skipping record with unparseable station key"),
        }
    }
    ordered.sort_by_key(|(id, _)| *id);

    let start = route_start();
    let mut date = start.with_timezone(&Moscow).date_naive();
    let mut prev_departure: Option<DateTime<Utc>> = None;
    let mut stations: Vec<Arc<StationInterval>> = Vec::with_capacity(ordered.len());

    for (id, record) in ordered {
        let (arrive, depart) = match parse_record_times(&record) {
            Ok(times) => times,
            Err(reason) => {
                warn!(station = %record.name, %reason, "skipping malformed station record");
                continue;
            }
        };

        let mut arrival = moscow_instant(date, arrive);
        if let Some(prev) = prev_departure
            && arrival < prev
        {
            date = date.succ_opt().unwrap_or(date);
            arrival = moscow_instant(date, arrive);
        }

        let mut departure = moscow_instant(date, depart);
        if departure < arrival {
            date = date.succ_opt().unwrap_or(date);
            departure = moscow_instant(date, depart);
        }
        prev_departure = Some(departure);

        let stand = departure - arrival;
        stations.push(Arc::new(StationInterval {
            id,
            name: record.name.clone(),
            timezone: timezone_for(&record.name),
            arrival,
            departure,
            stand,
            distance_km: distance_for(&record.name),
            // A long stand marks a stop as major even off the city list.
            is_major: stand >= Duration::minutes(20) || is_major_city(&record.name),
        }));
    }

    if stations.is_empty() {
        return Err(ScheduleError::Empty);
    }

    if let Some(index) = first_ordering_violation(&stations) {
        warn!(
            station = %stations[index].name,
            "station ordering invariant violated after rollover correction"
        );
    }

    let total_distance_km = stations.last().map(|s| s.distance_km).unwrap_or(0);
    Ok(Route {
        name: "Москва - Хабаровск".to_string(),
        start,
        total_distance_km,
        stations,
    })
}

/// Parse and validate all time-like fields of a record.
fn parse_record_times(record: &RawStation) -> Result<(NaiveTime, NaiveTime), String> {
    let arrive = parse_hhmm(&record.time_arrive)
        .map_err(|e| format!("arrival '{}': {e}", record.time_arrive))?;
    let depart = parse_hhmm(&record.time_depart)
        .map_err(|e| format!("departure '{}': {e}", record.time_depart))?;
    parse_stand_duration(&record.stand).map_err(|e| format!("stand '{}': {e}", record.stand))?;
    Ok((arrive, depart))
}

/// Interpret a date and time of day as a Moscow wall-clock instant.
fn moscow_instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time)
        .and_local_timezone(Moscow)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Extract the numeric suffix from a `city_<N>` key.
///
/// The suffix is not necessarily zero-padded, so "city_7" and "city_0007"
/// both parse to 7.
fn parse_city_number(key: &str) -> Option<u32> {
    key.strip_prefix("city_")?.parse().ok()
}
