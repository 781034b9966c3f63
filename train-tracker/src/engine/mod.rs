//! Concurrent question processing: admission control, load accounting,
//! metrics, and the batch orchestrator.

pub mod balancer;
pub mod config;
pub mod metrics;
pub mod orchestrator;
pub mod questions;
pub mod rate_limiter;
pub mod semaphore;

pub use balancer::{LoadBalancer, Worker, WorkerLease};
pub use config::{EngineConfig, RetryPolicy};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use orchestrator::QuestionEngine;
pub use rate_limiter::RateLimiter;
pub use semaphore::{AcquireCancelled, AdmissionPermit, AdmissionSemaphore};
