use std::sync::Arc;

use chrono::{TimeZone, Utc};
use chrono_tz::Europe::Moscow;

use train_tracker::engine::{EngineConfig, MetricsCollector, QuestionEngine};
use train_tracker::schedule::load_route;
use train_tracker::tracker::Tracker;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env();

    let route = load_route(&config.schedule_path).expect("Failed to load schedule");
    println!(
        "Loaded route {} ({} stations, {} km)",
        route.name,
        route.stations.len(),
        route.total_distance_km
    );

    let metrics = Arc::new(MetricsCollector::new());
    let tracker = Arc::new(Tracker::new(route, config.cache_ttl, metrics.clone()));
    tracker.spawn_cache_sweeper(config.cache_ttl);

    let engine = QuestionEngine::new(tracker.clone(), &config, metrics.clone());

    // A mid-journey instant, day 5 of the trip.
    let instant = Moscow
        .with_ymd_and_hms(2025, 10, 11, 10, 0, 0)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .expect("demo instant is a valid Moscow time");
    println!("Answering all questions for {instant}");
    println!();

    let results = engine.process_all(instant).await;
    for result in &results {
        println!("{}. {}", result.question.id(), result.text);
        for (field, value) in &result.answer {
            println!("   {field}: {value}");
        }
        println!();
    }

    let snapshot = metrics.snapshot();
    println!("Requests: {} ({} errors)", snapshot.total_requests, snapshot.total_errors);
    println!("Average latency: {:?}", snapshot.avg_latency);
    println!(
        "Cache: {} hits / {} misses ({:.0}% hit rate)",
        snapshot.cache_hits,
        snapshot.cache_misses,
        snapshot.cache_hit_rate * 100.0
    );

    let stats = tracker.stats();
    println!("Position queries: {}", stats.total_requests);
    for (id, load, active) in engine.worker_stats() {
        println!("Worker {id}: load {load}, active {active}");
    }
}
