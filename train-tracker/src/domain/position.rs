//! Resolved passenger positions and derived journey state.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use super::station::StationInterval;

/// The resolved state of the passenger at a query instant.
///
/// Either at a station, or between two stations with a linearly
/// interpolated distance. Neighbouring stations are explicit `Option`s
/// rather than nullable references, so "no previous station" is a checked
/// case, not an assumed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    /// Standing at (or waiting to depart from / having arrived at) a station.
    AtStation {
        station: Arc<StationInterval>,
        previous: Option<Arc<StationInterval>>,
        next: Option<Arc<StationInterval>>,
    },

    /// Travelling between two stations.
    BetweenStations {
        previous: Arc<StationInterval>,
        next: Arc<StationInterval>,
        /// Interpolated cumulative distance from the origin, in kilometres.
        distance_km: f64,
    },
}

impl Position {
    /// Distance from the origin in kilometres.
    pub fn distance_from_start(&self) -> f64 {
        match self {
            Position::AtStation { station, .. } => f64::from(station.distance_km),
            Position::BetweenStations { distance_km, .. } => *distance_km,
        }
    }

    /// The timezone governing the passenger's local time.
    ///
    /// Between stations this is the previous station's timezone, matching
    /// the convention that clocks change on arrival.
    pub fn timezone(&self) -> Tz {
        match self {
            Position::AtStation { station, .. } => station.timezone,
            Position::BetweenStations { previous, .. } => previous.timezone,
        }
    }

    /// The query instant expressed in the passenger's local timezone.
    pub fn local_time(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone())
    }

    /// True if the passenger is at a station.
    pub fn is_at_station(&self) -> bool {
        matches!(self, Position::AtStation { .. })
    }

    /// The station currently stood at, if any.
    pub fn current_station(&self) -> Option<&Arc<StationInterval>> {
        match self {
            Position::AtStation { station, .. } => Some(station),
            Position::BetweenStations { .. } => None,
        }
    }

    /// The previous station, if any.
    pub fn previous_station(&self) -> Option<&Arc<StationInterval>> {
        match self {
            Position::AtStation { previous, .. } => previous.as_ref(),
            Position::BetweenStations { previous, .. } => Some(previous),
        }
    }

    /// The next station ahead, if any.
    pub fn next_station(&self) -> Option<&Arc<StationInterval>> {
        match self {
            Position::AtStation { next, .. } => next.as_ref(),
            Position::BetweenStations { next, .. } => Some(next),
        }
    }
}

/// Whether the train is standing or moving at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainStatus {
    /// Standing at a station.
    Standing {
        station: Arc<StationInterval>,
        /// Time left until departure (zero once the departure has passed).
        remaining_stand: Duration,
    },

    /// Moving towards the next station.
    Moving {
        from: Arc<StationInterval>,
        to: Arc<StationInterval>,
        /// Time until arrival at `to`.
        time_to_next: Duration,
    },
}

/// Summary of the journey so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyInfo {
    /// 1-based day of the journey.
    pub day_number: i64,

    /// When the journey started.
    pub start: DateTime<Utc>,

    /// Time elapsed since the start.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Novosibirsk;
    use chrono_tz::Europe::Moscow;

    fn station(id: u32, tz: Tz, distance_km: u32) -> Arc<StationInterval> {
        let arrival = Utc.with_ymd_and_hms(2025, 10, 7, 12, 0, 0).unwrap();
        Arc::new(StationInterval {
            id,
            name: format!("station-{id}"),
            timezone: tz,
            arrival,
            departure: arrival,
            stand: Duration::zero(),
            distance_km,
            is_major: false,
        })
    }

    #[test]
    fn between_stations_uses_previous_timezone() {
        let pos = Position::BetweenStations {
            previous: station(3, Novosibirsk, 300),
            next: station(4, Moscow, 400),
            distance_km: 350.0,
        };

        assert_eq!(pos.timezone(), Novosibirsk);
        assert_eq!(pos.distance_from_start(), 350.0);
        assert!(!pos.is_at_station());
        assert_eq!(pos.previous_station().unwrap().id, 3);
        assert_eq!(pos.next_station().unwrap().id, 4);
    }

    #[test]
    fn at_station_exposes_neighbours() {
        let pos = Position::AtStation {
            station: station(2, Moscow, 200),
            previous: Some(station(1, Moscow, 100)),
            next: None,
        };

        assert!(pos.is_at_station());
        assert_eq!(pos.current_station().unwrap().id, 2);
        assert_eq!(pos.previous_station().unwrap().id, 1);
        assert!(pos.next_station().is_none());
        assert_eq!(pos.distance_from_start(), 200.0);
    }

    #[test]
    fn positions_compare_structurally() {
        let between = Position::BetweenStations {
            previous: station(1, Moscow, 100),
            next: station(2, Moscow, 200),
            distance_km: 150.0,
        };
        assert_eq!(between.clone(), between);

        let at = Position::AtStation {
            station: station(1, Moscow, 100),
            previous: None,
            next: None,
        };
        assert_ne!(between, at);
    }

    #[test]
    fn local_time_converts_into_station_timezone() {
        let pos = Position::AtStation {
            station: station(5, Novosibirsk, 500),
            previous: None,
            next: None,
        };

        let instant = Utc.with_ymd_and_hms(2025, 10, 7, 12, 0, 0).unwrap();
        // Novosibirsk is UTC+7.
        assert_eq!(pos.local_time(instant).format("%H:%M").to_string(), "19:00");
    }
}
