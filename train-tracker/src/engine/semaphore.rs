//! Admission semaphore bounding in-flight question computations.
//!
//! Thin wrapper over `tokio::sync::Semaphore` that hands out RAII permits,
//! so release is guaranteed on every exit path and always strictly paired
//! with the acquire.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Error returned when a cancellable acquire is cancelled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("admission acquire was cancelled")]
pub struct AcquireCancelled;

/// A held admission slot. Dropping it releases the slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

/// Bounds the number of simultaneously admitted computations.
#[derive(Debug, Clone)]
pub struct AdmissionSemaphore {
    inner: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionSemaphore {
    /// Create a semaphore with a fixed capacity; a zero capacity is
    /// floored to one so admission can always make progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Acquire a slot, waiting if the semaphore is at capacity.
    pub async fn acquire(&self) -> AdmissionPermit {
        // The semaphore is never closed, so acquisition can only fail if
        // it were; treat that as an unreachable state by waiting forever.
        match self.inner.clone().acquire_owned().await {
            Ok(permit) => AdmissionPermit { _permit: permit },
            Err(_) => std::future::pending().await,
        }
    }

    /// Try to acquire a slot without blocking.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        self.inner
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    /// Acquire a slot, giving up when `cancel` completes first.
    pub async fn acquire_with_cancel<F>(&self, cancel: F) -> Result<AdmissionPermit, AcquireCancelled>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            permit = self.acquire() => Ok(permit),
            _ = cancel => Err(AcquireCancelled),
        }
    }

    /// The fixed capacity this semaphore was constructed with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently free slots.
    pub fn available(&self) -> usize {
        self.inner.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let sem = AdmissionSemaphore::new(1);

        let permit = sem.acquire().await;
        assert_eq!(sem.available(), 0);
        assert!(sem.try_acquire().is_none());

        drop(permit);
        assert_eq!(sem.available(), 1);
        assert!(sem.try_acquire().is_some());
    }

    #[tokio::test]
    async fn acquire_blocks_at_capacity() {
        let sem = AdmissionSemaphore::new(2);
        let _a = sem.acquire().await;
        let _b = sem.acquire().await;

        let blocked =
            tokio::time::timeout(Duration::from_millis(20), sem.acquire()).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn zero_capacity_is_floored_to_one() {
        let sem = AdmissionSemaphore::new(0);
        assert_eq!(sem.capacity(), 1);

        let permit = sem.try_acquire();
        assert!(permit.is_some());
    }

    #[tokio::test]
    async fn cancelled_acquire_returns_error() {
        let sem = AdmissionSemaphore::new(1);
        let _held = sem.acquire().await;

        let result = sem
            .acquire_with_cancel(tokio::time::sleep(Duration::from_millis(10)))
            .await;
        assert_eq!(result.unwrap_err(), AcquireCancelled);
    }

    #[tokio::test]
    async fn uncancelled_acquire_succeeds() {
        let sem = AdmissionSemaphore::new(1);

        let result = sem
            .acquire_with_cancel(std::future::pending())
            .await;
        assert!(result.is_ok());
    }
}
