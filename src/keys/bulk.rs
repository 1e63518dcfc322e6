//! Bounded fan-out over a set of keys.
//!
//! Every key is attempted exactly once. A failure is recorded against its key
//! and never stops the rest of the batch.

use crate::error::AppResult;
use crate::keys::types::ProvisionedKey;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};

/// One key the batch could not process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub hash: String,
    pub name: String,
    pub error: String,
}

/// Outcome of a bulk operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Run `op` on the hash of every key, at most `concurrency` at a time.
pub async fn for_each_key<F, Fut, T>(
    action: &str,
    keys: &[ProvisionedKey],
    concurrency: usize,
    op: F,
) -> BatchReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    // Owned keys keep the returned future free of borrows into the caller
    let outcomes: Vec<_> = stream::iter(keys.to_vec())
        .map(|key: ProvisionedKey| {
            let fut = op(key.hash.clone());
            async move { (key, fut.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = BatchReport {
        attempted: keys.len(),
        ..Default::default()
    };

    for (key, outcome) in outcomes {
        match outcome {
            Ok(_) => report.succeeded += 1,
            Err(e) => {
                warn!("Failed to {} key {} ({}): {}", action, key.hash, key.name, e);
                report.failures.push(BatchFailure {
                    hash: key.hash,
                    name: key.name,
                    error: e.to_string(),
                });
            }
        }
    }
    report.failed = report.failures.len();

    info!(
        "Bulk {}: {} attempted, {} succeeded, {} failed",
        action, report.attempted, report.succeeded, report.failed
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn keys(n: usize) -> Vec<ProvisionedKey> {
        (0..n)
            .map(|i| ProvisionedKey::new(format!("key-{}", i), format!("hash-{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let keys = keys(5);
        let seen = Arc::new(AtomicUsize::new(0));

        let report = for_each_key("disable", &keys, 2, |hash| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                if hash == "hash-2" {
                    Err(AppError::upstream(Some(500), "boom"))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(report.attempted, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failures[0].hash, "hash-2");
        assert_eq!(report.failures[0].name, "key-2");
        assert!(report.failures[0].error.contains("boom"));
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let keys = keys(20);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let report = for_each_key("delete", &keys, 3, |_hash| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, AppError>(true)
            }
        })
        .await;

        assert!(report.is_clean());
        assert_eq!(report.succeeded, 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 2);
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn test_batch_future_is_send() {
        let keys = keys(2);
        assert_send(for_each_key("delete", &keys, 2, |_hash| async {
            Ok::<_, AppError>(())
        }));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let report = for_each_key("delete", &[], 4, |_hash| async { Ok::<_, AppError>(()) }).await;
        assert_eq!(report, BatchReport::default());
    }
}
