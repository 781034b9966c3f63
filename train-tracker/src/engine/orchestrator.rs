//! Concurrent fan-out of the ten journey questions.
//!
//! Each batch resolves the position once, then runs one task per question.
//! Every task passes the same admission gauntlet in order: rate limiter,
//! admission semaphore, worker lease. Releases happen in reverse order as
//! the RAII guards go out of scope.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{Position, Question, QuestionResult, error_answer, is_error_answer};
use crate::engine::balancer::LoadBalancer;
use crate::engine::config::{EngineConfig, RetryPolicy};
use crate::engine::metrics::MetricsCollector;
use crate::engine::questions;
use crate::engine::rate_limiter::RateLimiter;
use crate::engine::semaphore::AdmissionSemaphore;
use crate::tracker::Tracker;

/// Runs question batches against a tracker under admission control.
pub struct QuestionEngine {
    tracker: Arc<Tracker>,
    limiter: Arc<RateLimiter>,
    semaphore: AdmissionSemaphore,
    balancer: Arc<LoadBalancer>,
    metrics: Arc<MetricsCollector>,
    retry: RetryPolicy,
}

impl QuestionEngine {
    /// Create an engine. Must be called within a tokio runtime (the rate
    /// limiter spawns its refill task).
    pub fn new(tracker: Arc<Tracker>, config: &EngineConfig, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            tracker,
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit_per_second,
                std::time::Duration::from_secs(1),
            )),
            semaphore: AdmissionSemaphore::new(config.max_concurrent),
            balancer: Arc::new(LoadBalancer::new(config.num_workers)),
            metrics,
            retry: config.retry.clone(),
        }
    }

    /// The tracker this engine queries.
    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Per-worker (id, load, active) snapshot.
    pub fn worker_stats(&self) -> Vec<(usize, u64, bool)> {
        self.balancer.worker_stats()
    }

    /// Answer all ten questions for `instant` concurrently.
    ///
    /// Always returns exactly one result per question, ordered by question
    /// identity; individual failures surface as error payloads.
    pub async fn process_all(&self, instant: DateTime<Utc>) -> Vec<QuestionResult> {
        let position = match self.tracker.current_position(instant) {
            Ok(position) => Some(position),
            Err(err) => {
                warn!(%instant, error = %err, "position resolution failed for batch");
                None
            }
        };

        let (tx, mut rx) = mpsc::channel(Question::ALL.len());
        for question in Question::ALL {
            let tx = tx.clone();
            let tracker = self.tracker.clone();
            let limiter = self.limiter.clone();
            let semaphore = self.semaphore.clone();
            let balancer = self.balancer.clone();
            let metrics = self.metrics.clone();
            let retry = self.retry.clone();
            let position = position.clone();

            tokio::spawn(async move {
                limiter.wait().await;
                let _permit = semaphore.acquire().await;
                let lease = balancer.next_worker();
                debug!(
                    question = question.id(),
                    worker = lease.worker_id(),
                    "question task admitted"
                );

                let result = run_with_retry(
                    &tracker,
                    question,
                    instant,
                    position.as_ref(),
                    &retry,
                    &metrics,
                )
                .await;

                // Receiver only closes if the batch was abandoned.
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(Question::ALL.len());
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results.sort_by_key(|r| r.question.id());
        results
    }
}

/// Run one question task, retrying failed attempts per the policy.
async fn run_with_retry(
    tracker: &Tracker,
    question: Question,
    instant: DateTime<Utc>,
    position: Option<&Position>,
    retry: &RetryPolicy,
    metrics: &MetricsCollector,
) -> QuestionResult {
    let max_attempts = retry.max_attempts();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        tracker.count_question(question);

        let started = Instant::now();
        let answer = questions::answer(tracker, question, instant, position);
        let succeeded = !is_error_answer(&answer);
        metrics.record_request(started.elapsed(), succeeded);

        if succeeded {
            return QuestionResult {
                question,
                text: question.text(),
                answer,
                completed_at: Utc::now(),
            };
        }

        last_error = answer
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();

        if attempt < max_attempts {
            let delay = retry.backoff_after(attempt);
            debug!(
                question = question.id(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                "question attempt failed, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    warn!(
        question = question.id(),
        attempts = max_attempts,
        error = %last_error,
        "question task exhausted its attempts"
    );

    let mut answer = error_answer(format!(
        "не удалось обработать вопрос после {max_attempts} попыток: {last_error}"
    ));
    answer.insert("attempts".to_string(), max_attempts.into());
    answer.insert("last_error".to_string(), last_error.into());

    QuestionResult {
        question,
        text: question.text(),
        answer,
        completed_at: Utc::now(),
    }
}
