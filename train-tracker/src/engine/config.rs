//! Engine configuration, loadable from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Retry behaviour for failed question tasks.
///
/// The policy is explicit configuration, not a runtime heuristic: callers
/// choose it up front rather than comparing run durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Run each task exactly once.
    Disabled,

    /// Retry with linear-multiple backoff: attempt `n` sleeps
    /// `n * base_delay` before the next try.
    Backoff {
        max_attempts: u32,
        base_delay: Duration,
    },
}

impl RetryPolicy {
    /// Total number of attempts a task may make.
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::Disabled => 1,
            RetryPolicy::Backoff { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    /// Backoff before the attempt after `attempt` (1-based) failed.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::Disabled => Duration::ZERO,
            RetryPolicy::Backoff { base_delay, .. } => *base_delay * attempt,
        }
    }
}

/// Configuration for the question engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum simultaneously in-flight question computations.
    pub max_concurrent: usize,

    /// Rate limiter capacity; one token refills per second.
    pub rate_limit_per_second: u32,

    /// TTL for cached positions.
    pub cache_ttl: Duration,

    /// Number of logical workers for load balancing.
    pub num_workers: usize,

    /// Retry policy for failed question tasks.
    pub retry: RetryPolicy,

    /// Path to the JSON schedule file.
    pub schedule_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            rate_limit_per_second: 100,
            cache_ttl: Duration::from_secs(300),
            num_workers: 5,
            retry: RetryPolicy::Backoff {
                max_attempts: 3,
                base_delay: Duration::from_millis(100),
            },
            schedule_path: PathBuf::from("reyna_route.json"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for unset or malformed values (with a warning for the
    /// latter).
    ///
    /// Recognized variables: `MAX_CONCURRENT_REQUESTS`,
    /// `RATE_LIMIT_PER_SECOND`, `CACHE_TTL` (seconds), `NUM_WORKERS`,
    /// `MAX_RETRIES` (0 disables retries), `SCHEDULE_PATH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_retries = env_parse("MAX_RETRIES", 3u32);
        let retry = if max_retries == 0 {
            RetryPolicy::Disabled
        } else {
            RetryPolicy::Backoff {
                max_attempts: max_retries,
                base_delay: Duration::from_millis(100),
            }
        };

        Self {
            max_concurrent: env_parse_nonzero("MAX_CONCURRENT_REQUESTS", defaults.max_concurrent),
            rate_limit_per_second: env_parse_nonzero(
                "RATE_LIMIT_PER_SECOND",
                defaults.rate_limit_per_second,
            ),
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL", 300u64)),
            num_workers: env_parse_nonzero("NUM_WORKERS", defaults.num_workers),
            retry,
            schedule_path: std::env::var("SCHEDULE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.schedule_path),
        }
    }
}

/// Like `env_parse`, but additionally treats zero as malformed.
///
/// Worker and admission counts must be positive; a zero would stall or
/// break the engine rather than configure it.
fn env_parse_nonzero<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + PartialEq + From<u8>,
{
    let value = env_parse(name, default);
    if value == T::from(0u8) {
        warn!(name, "value must be positive, using default");
        default
    } else {
        value
    }
}

/// Read and parse an environment variable, warning on malformed values.
fn env_parse<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(name, value, "malformed environment value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
