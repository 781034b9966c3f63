//! The long-lived tracker: route data, position cache, and usage counters.
//!
//! Constructed once at startup and shared by handle; all mutable state it
//! owns (cache, counters) is internally synchronized.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::cache::TtlCache;
use crate::domain::{JourneyInfo, Position, Question, StationInterval, TrainStatus};
use crate::engine::MetricsCollector;
use crate::locator::{LocateError, locate};
use crate::schedule::Route;

/// Usage statistics for the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStats {
    /// Total position queries served.
    pub total_requests: u64,

    /// Per-question task counts, indexed by question identity minus one.
    pub question_counts: [u64; 10],

    /// Physically stored cache entries.
    pub cache_size: usize,
}

/// Tracks the passenger's position along a loaded route.
pub struct Tracker {
    route: Route,
    by_name: HashMap<String, usize>,
    by_id: HashMap<u32, usize>,
    cache: Arc<TtlCache<i64, Position>>,
    cache_ttl: StdDuration,
    metrics: Arc<MetricsCollector>,
    request_counter: AtomicU64,
    question_counters: [AtomicU64; 10],
}

impl Tracker {
    /// Create a tracker over a loaded route.
    pub fn new(route: Route, cache_ttl: StdDuration, metrics: Arc<MetricsCollector>) -> Self {
        let by_name = route
            .stations
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        let by_id = route
            .stations
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();

        Self {
            route,
            by_name,
            by_id,
            cache: Arc::new(TtlCache::new()),
            cache_ttl,
            metrics,
            request_counter: AtomicU64::new(0),
            question_counters: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    /// The loaded route.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Stations in visit order.
    pub fn stations(&self) -> &[Arc<StationInterval>] {
        &self.route.stations
    }

    /// O(1) station lookup by display name.
    pub fn station_by_name(&self, name: &str) -> Option<&Arc<StationInterval>> {
        self.by_name.get(name).map(|&i| &self.route.stations[i])
    }

    /// O(1) station lookup by ordinal id.
    pub fn station_by_id(&self, id: u32) -> Option<&Arc<StationInterval>> {
        self.by_id.get(&id).map(|&i| &self.route.stations[i])
    }

    /// Start sweeping expired position cache entries on a fixed period.
    pub fn spawn_cache_sweeper(&self, period: StdDuration) {
        let _ = self.cache.spawn_sweeper(period);
    }

    /// Resolve the passenger's position at `instant`, consulting the
    /// position cache first.
    ///
    /// Cache keys are the instant truncated to whole seconds, so
    /// near-simultaneous queries share one computation.
    pub fn current_position(&self, instant: DateTime<Utc>) -> Result<Position, LocateError> {
        self.request_counter.fetch_add(1, Ordering::Relaxed);

        let key = instant.timestamp();
        if let Some(position) = self.cache.get(&key) {
            self.metrics.record_cache_hit();
            return Ok(position);
        }
        self.metrics.record_cache_miss();

        let position = locate(&self.route.stations, instant)?;
        self.cache.set(key, position.clone(), self.cache_ttl);
        Ok(position)
    }

    /// Whether the train is standing or moving at `instant`.
    pub fn train_status(&self, instant: DateTime<Utc>, position: &Position) -> TrainStatus {
        match position {
            Position::AtStation { station, .. } => TrainStatus::Standing {
                station: station.clone(),
                remaining_stand: (station.departure - instant).max(Duration::zero()),
            },
            Position::BetweenStations { previous, next, .. } => TrainStatus::Moving {
                from: previous.clone(),
                to: next.clone(),
                time_to_next: next.arrival - instant,
            },
        }
    }

    /// Day number and elapsed time of the journey at `instant`.
    pub fn journey_info(&self, instant: DateTime<Utc>) -> JourneyInfo {
        let elapsed = instant - self.route.start;
        JourneyInfo {
            day_number: elapsed.num_hours() / 24 + 1,
            start: self.route.start,
            elapsed,
        }
    }

    /// Count one task execution for a question.
    pub fn count_question(&self, question: Question) {
        self.question_counters[usize::from(question.id()) - 1].fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot of usage statistics.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            total_requests: self.request_counter.load(Ordering::Relaxed),
            question_counts: std::array::from_fn(|i| {
                self.question_counters[i].load(Ordering::Relaxed)
            }),
            cache_size: self.cache.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::build_route;
    use chrono::TimeZone;
    use chrono_tz::Europe::Moscow;
    use std::collections::HashMap as StdHashMap;

    fn test_route() -> Route {
        let mut raw = StdHashMap::new();
        for (key, name, arrive, stand, depart) in [
            ("city_1", "Москва", "22:10", "0мин", "22:10"),
            ("city_2", "Владимир Пасс", "0:54", "2мин", "0:56"),
            ("city_3", "Киров Пасс", "11:27", "15мин", "11:42"),
        ] {
            raw.insert(
                key.to_string(),
                crate::schedule::RawStation {
                    name: name.to_string(),
                    time_arrive: arrive.to_string(),
                    stand: stand.to_string(),
                    time_depart: depart.to_string(),
                },
            );
        }
        build_route(raw).unwrap()
    }

    fn tracker() -> Tracker {
        Tracker::new(
            test_route(),
            StdDuration::from_secs(60),
            Arc::new(MetricsCollector::new()),
        )
    }

    #[test]
    fn lookups_by_name_and_id() {
        let tracker = tracker();
        assert_eq!(tracker.station_by_name("Киров Пасс").unwrap().id, 3);
        assert_eq!(tracker.station_by_id(2).unwrap().name, "Владимир Пасс");
        assert!(tracker.station_by_name("Нигдеград").is_none());
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let tracker = tracker();
        let instant = Moscow
            .with_ymd_and_hms(2025, 10, 7, 5, 0, 0)
            .unwrap()
            .with_timezone(&Utc);

        tracker.current_position(instant).unwrap();
        tracker.current_position(instant).unwrap();

        let metrics = tracker.metrics.snapshot();
        assert_eq!(metrics.cache_misses, 1);
        assert_eq!(metrics.cache_hits, 1);

        let stats = tracker.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_size, 1);
    }

    #[test]
    fn status_standing_during_a_stop() {
        let tracker = tracker();
        // Mid-stand at Киров Пасс (11:27-11:42 on day 2, Moscow time).
        let instant = Moscow
            .with_ymd_and_hms(2025, 10, 7, 11, 30, 0)
            .unwrap()
            .with_timezone(&Utc);

        let position = tracker.current_position(instant).unwrap();
        match tracker.train_status(instant, &position) {
            TrainStatus::Standing {
                station,
                remaining_stand,
            } => {
                assert_eq!(station.name, "Киров Пасс");
                assert_eq!(remaining_stand, Duration::minutes(12));
            }
            status => panic!("expected standing, got {status:?}"),
        }
    }

    #[test]
    fn status_moving_between_stops() {
        let tracker = tracker();
        let instant = Moscow
            .with_ymd_and_hms(2025, 10, 7, 5, 0, 0)
            .unwrap()
            .with_timezone(&Utc);

        let position = tracker.current_position(instant).unwrap();
        match tracker.train_status(instant, &position) {
            TrainStatus::Moving { from, to, time_to_next } => {
                assert_eq!(from.name, "Владимир Пасс");
                assert_eq!(to.name, "Киров Пасс");
                assert_eq!(time_to_next, Duration::minutes(6 * 60 + 27));
            }
            status => panic!("expected moving, got {status:?}"),
        }
    }

    #[test]
    fn journey_day_counts_from_the_start() {
        let tracker = tracker();

        let day1 = tracker.route().start + Duration::hours(2);
        assert_eq!(tracker.journey_info(day1).day_number, 1);

        let day3 = tracker.route().start + Duration::hours(50);
        let info = tracker.journey_info(day3);
        assert_eq!(info.day_number, 3);
        assert_eq!(info.elapsed, Duration::hours(50));
    }

    #[test]
    fn question_counters_accumulate() {
        let tracker = tracker();
        tracker.count_question(Question::LocalTime);
        tracker.count_question(Question::LocalTime);
        tracker.count_question(Question::UpcomingStations);

        let stats = tracker.stats();
        assert_eq!(stats.question_counts[0], 2);
        assert_eq!(stats.question_counts[9], 1);
        assert_eq!(stats.question_counts[4], 0);
    }
}
