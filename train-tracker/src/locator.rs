//! Interval locator: resolves a query instant to a position on the route.
//!
//! Binary search over the time-ordered station intervals, with a linear
//! scan as a safety net for edge cases the search narrowing can miss.
//! Pure functions of their inputs; no shared state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{Position, StationInterval};

/// Error from position resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// The schedule contains no stations.
    #[error("schedule is empty")]
    EmptySchedule,

    /// The instant could not be placed on the route, even by linear scan.
    #[error("instant is outside all defined intervals")]
    OutOfBounds,
}

/// Resolve the position at `instant` over a sorted station sequence.
///
/// Boundary policy: an instant before the first station's departure resolves
/// to the first station; an instant after the last station's arrival resolves
/// to the last. Everything in between is found by binary search, falling back
/// to a linear scan if the search exits without a match.
pub fn locate(
    stations: &[Arc<StationInterval>],
    instant: DateTime<Utc>,
) -> Result<Position, LocateError> {
    if stations.is_empty() {
        return Err(LocateError::EmptySchedule);
    }

    if instant < stations[0].departure {
        return Ok(at_station(stations, 0));
    }

    let last = stations.len() - 1;
    if instant > stations[last].arrival {
        return Ok(at_station(stations, last));
    }

    locate_binary(stations, instant)
        .or_else(|| locate_linear(stations, instant))
        .ok_or(LocateError::OutOfBounds)
}

/// Binary search over the ordered intervals.
///
/// At each midpoint, tests in order: inside the midpoint's own window,
/// inside the gap after it, inside the gap before it. Otherwise narrows
/// by comparing against the midpoint's arrival.
fn locate_binary(
    stations: &[Arc<StationInterval>],
    instant: DateTime<Utc>,
) -> Option<Position> {
    let mut left = 0usize;
    let mut right = stations.len() - 1;

    while left <= right {
        let mid = left + (right - left) / 2;
        let station = &stations[mid];

        if station.contains(instant) {
            return Some(at_station(stations, mid));
        }

        if let Some(next) = stations.get(mid + 1)
            && instant > station.departure
            && instant < next.arrival
        {
            return Some(between_stations(station, next, instant));
        }

        if mid > 0 {
            let prev = &stations[mid - 1];
            if instant > prev.departure && instant < station.arrival {
                return Some(between_stations(prev, station, instant));
            }
        }

        if instant < station.arrival {
            if mid == 0 {
                break;
            }
            right = mid - 1;
        } else {
            left = mid + 1;
        }
    }

    None
}

/// Linear scan fallback.
///
/// Covers numeric and timezone edge cases where the binary narrowing can
/// exit without a match on inputs that violate its ordering assumptions.
fn locate_linear(
    stations: &[Arc<StationInterval>],
    instant: DateTime<Utc>,
) -> Option<Position> {
    for (i, station) in stations.iter().enumerate() {
        if station.contains(instant) {
            return Some(at_station(stations, i));
        }

        if let Some(next) = stations.get(i + 1)
            && instant > station.departure
            && instant < next.arrival
        {
            return Some(between_stations(station, next, instant));
        }
    }

    None
}

fn at_station(stations: &[Arc<StationInterval>], index: usize) -> Position {
    Position::AtStation {
        station: stations[index].clone(),
        previous: index.checked_sub(1).map(|i| stations[i].clone()),
        next: stations.get(index + 1).cloned(),
    }
}

fn between_stations(
    prev: &Arc<StationInterval>,
    next: &Arc<StationInterval>,
    instant: DateTime<Utc>,
) -> Position {
    Position::BetweenStations {
        previous: prev.clone(),
        next: next.clone(),
        distance_km: interpolate_distance(prev, next, instant),
    }
}

/// Linear interpolation of distance between two stations.
///
/// Fractional progress is `(instant - prev.departure) / (next.arrival -
/// prev.departure)` clamped to `[0, 1]`; a non-positive divisor is
/// substituted by one second.
fn interpolate_distance(
    prev: &StationInterval,
    next: &StationInterval,
    instant: DateTime<Utc>,
) -> f64 {
    let mut total = (next.arrival - prev.departure).num_seconds() as f64;
    if total <= 0.0 {
        total = 1.0;
    }

    let elapsed = (instant - prev.departure).num_seconds() as f64;
    let progress = (elapsed / total).clamp(0.0, 1.0);

    let prev_km = f64::from(prev.distance_km);
    let next_km = f64::from(next.distance_km);
    prev_km + progress * (next_km - prev_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Europe::Moscow;
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 6, 0, 0, 0).unwrap()
    }

    /// Build a station from minute offsets relative to `base()`.
    fn station(id: u32, arr_min: i64, dep_min: i64, distance_km: u32) -> Arc<StationInterval> {
        let arrival = base() + Duration::minutes(arr_min);
        let departure = base() + Duration::minutes(dep_min);
        Arc::new(StationInterval {
            id,
            name: format!("station-{id}"),
            timezone: Moscow,
            arrival,
            departure,
            stand: departure - arrival,
            distance_km,
            is_major: false,
        })
    }

    /// The three-station route from the worked example: origin at minute 0,
    /// a stop at 10:00-10:20 at 500 km, terminus arriving 20:00 at 1000 km.
    fn example_route() -> Vec<Arc<StationInterval>> {
        vec![
            station(1, 0, 0, 0),
            station(2, 600, 620, 500),
            station(3, 1200, 1200, 1000),
        ]
    }

    fn at(min: i64) -> DateTime<Utc> {
        base() + Duration::minutes(min)
    }

    #[test]
    fn empty_schedule_is_an_error() {
        assert_eq!(locate(&[], at(0)), Err(LocateError::EmptySchedule));
    }

    #[test]
    fn before_first_departure_resolves_to_first_station() {
        let stations = example_route();
        let pos = locate(&stations, at(-60)).unwrap();
        assert_eq!(pos.current_station().unwrap().id, 1);
        assert!(pos.previous_station().is_none());
    }

    #[test]
    fn after_last_arrival_resolves_to_last_station() {
        let stations = example_route();
        let pos = locate(&stations, at(2000)).unwrap();
        assert_eq!(pos.current_station().unwrap().id, 3);
        assert!(pos.next_station().is_none());
    }

    #[test]
    fn inside_a_stand_window_resolves_to_that_station() {
        let stations = example_route();
        let pos = locate(&stations, at(610)).unwrap();
        assert_eq!(pos.current_station().unwrap().id, 2);
        assert_eq!(pos.previous_station().unwrap().id, 1);
        assert_eq!(pos.next_station().unwrap().id, 3);
    }

    #[test]
    fn between_stations_interpolates_distance() {
        let stations = example_route();

        // 15:00 is 280 minutes past the 10:20 departure; the gap to the
        // 20:00 arrival is 580 minutes.
        let pos = locate(&stations, at(900)).unwrap();
        assert!(!pos.is_at_station());
        assert_eq!(pos.previous_station().unwrap().id, 2);
        assert_eq!(pos.next_station().unwrap().id, 3);

        let expected = 500.0 + (280.0 / 580.0) * 500.0;
        assert!((pos.distance_from_start() - expected).abs() < 1e-9);
    }

    #[test]
    fn interpolation_boundaries_hit_station_distances() {
        let prev = station(2, 600, 620, 500);
        let next = station(3, 1200, 1200, 1000);

        assert_eq!(interpolate_distance(&prev, &next, prev.departure), 500.0);
        assert_eq!(interpolate_distance(&prev, &next, next.arrival), 1000.0);
    }

    #[test]
    fn zero_gap_divisor_is_guarded() {
        // Departure coincides with the next arrival: divisor would be 0.
        let prev = station(1, 0, 100, 200);
        let next = station(2, 100, 120, 300);

        let d = interpolate_distance(&prev, &next, prev.departure);
        assert_eq!(d, 200.0);
    }

    #[test]
    fn fallback_linear_scan_agrees_on_the_example_route() {
        let stations = example_route();
        for min in 0..=1200 {
            let instant = at(min);
            let binary = locate_binary(&stations, instant);
            let linear = locate_linear(&stations, instant);
            assert_eq!(
                binary.as_ref().map(describe),
                linear.as_ref().map(describe),
                "divergence at minute {min}"
            );
        }
    }

    /// Shape of a position for structural comparison in tests.
    fn describe(pos: &Position) -> (bool, Option<u32>, Option<u32>, i64) {
        (
            pos.is_at_station(),
            pos.previous_station().map(|s| s.id),
            pos.next_station().map(|s| s.id),
            (pos.distance_from_start() * 1000.0).round() as i64,
        )
    }

    /// Strategy: a route of 2..30 stations with random travel gaps and stands.
    fn route_strategy() -> impl Strategy<Value = Vec<Arc<StationInterval>>> {
        prop::collection::vec((1i64..600, 0i64..90, 1u32..500), 2..30).prop_map(|legs| {
            let mut stations = Vec::with_capacity(legs.len());
            let mut clock = 0i64;
            let mut distance = 0u32;
            for (i, (gap_min, stand_min, leg_km)) in legs.into_iter().enumerate() {
                clock += gap_min;
                distance += leg_km;
                let arr = clock;
                clock += stand_min;
                stations.push(station(i as u32 + 1, arr, clock, distance));
            }
            stations
        })
    }

    proptest! {
        #[test]
        fn distances_are_monotone(stations in route_strategy()) {
            for pair in stations.windows(2) {
                prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            }
        }

        /// Any instant between first arrival and last departure resolves,
        /// and the binary path agrees with the linear fallback.
        #[test]
        fn locator_is_total_and_paths_agree(
            stations in route_strategy(),
            fraction in 0.0f64..=1.0,
        ) {
            let start = stations[0].arrival;
            let end = stations[stations.len() - 1].departure;
            let span = (end - start).num_seconds();
            let instant = start + Duration::seconds((span as f64 * fraction) as i64);

            let resolved = locate(&stations, instant);
            prop_assert!(resolved.is_ok());

            let binary = locate_binary(&stations, instant);
            let linear = locate_linear(&stations, instant);
            prop_assert_eq!(
                binary.as_ref().map(describe),
                linear.as_ref().map(describe)
            );
        }
    }
}
