//! Station stop intervals.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// One stop on the route: a station with its arrival-to-departure window.
///
/// Intervals are constructed once at schedule load time and are immutable
/// thereafter. Across the ordered route the invariant
/// `arrival[i] <= departure[i] <= arrival[i+1]` holds after the loader's
/// day-rollover correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInterval {
    /// Ordinal position along the route (from the `city_<N>` schedule key).
    pub id: u32,

    /// Display name of the station.
    pub name: String,

    /// IANA timezone of the station.
    pub timezone: Tz,

    /// Arrival instant.
    pub arrival: DateTime<Utc>,

    /// Departure instant. Equals `arrival + stand`.
    pub departure: DateTime<Utc>,

    /// Stand duration at this station (never negative).
    pub stand: Duration,

    /// Cumulative distance from the origin in kilometres.
    pub distance_km: u32,

    /// Whether this is a major stop (long stand or a major city).
    pub is_major: bool,
}

impl StationInterval {
    /// True if `instant` falls inside this stop's `[arrival, departure]` window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.arrival && instant <= self.departure
    }
}

impl AsRef<StationInterval> for StationInterval {
    fn as_ref(&self) -> &StationInterval {
        self
    }
}

/// Check the ordering invariant over a full station sequence.
///
/// Returns the index of the first violating station, or `None` if the
/// sequence is well-ordered.
pub fn first_ordering_violation(stations: &[impl AsRef<StationInterval>]) -> Option<usize> {
    for (i, station) in stations.iter().enumerate() {
        let station = station.as_ref();
        if station.departure < station.arrival {
            return Some(i);
        }
        if let Some(next) = stations.get(i + 1)
            && next.as_ref().arrival < station.departure
        {
            return Some(i + 1);
        }
    }
    None
}
