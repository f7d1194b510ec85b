//! Bounded-concurrency batching for destructive remote operations.

use std::future::Future;

use serde::Serialize;

use mirrorfs_core::result::AppResult;

/// One key that could not be deleted remotely.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// The key the failure applies to.
    pub key: String,
    /// Why the delete failed.
    pub message: String,
}

/// Aggregated result of a windowed delete batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    /// Keys whose remote delete succeeded (including already-absent ones).
    pub succeeded: Vec<String>,
    /// How many of the succeeded keys actually existed remotely.
    pub removed_remote: usize,
    /// Per-item failures; these keys stay in the mirror for a later retry.
    pub failed: Vec<BatchFailure>,
}

/// Delete `keys` through `delete`, dispatching a fixed-size window of calls
/// together and waiting for the whole window before advancing.
///
/// Each item's failure is captured independently; one failing key never
/// aborts the batch. There is no ordering guarantee across items within a
/// window.
pub async fn delete_in_windows<F, Fut>(keys: &[String], window: usize, delete: F) -> BatchOutcome
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let window = window.max(1);
    let mut outcome = BatchOutcome::default();

    for chunk in keys.chunks(window) {
        let in_flight: Vec<_> = chunk
            .iter()
            .map(|key| {
                let fut = delete(key.clone());
                async move { (key.clone(), fut.await) }
            })
            .collect();

        for (key, result) in futures::future::join_all(in_flight).await {
            match result {
                Ok(existed) => {
                    if existed {
                        outcome.removed_remote += 1;
                    }
                    outcome.succeeded.push(key);
                }
                Err(err) => outcome.failed.push(BatchFailure {
                    key,
                    message: err.to_string(),
                }),
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use mirrorfs_core::error::AppError;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r/file-{i}.jpg")).collect()
    }

    #[tokio::test]
    async fn test_window_bounds_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let keys = keys(13);

        let outcome = delete_in_windows(&keys, 5, |_key| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(true)
            }
        })
        .await;

        assert_eq!(outcome.succeeded.len(), 13);
        assert_eq!(outcome.removed_remote, 13);
        assert!(outcome.failed.is_empty());
        assert!(peak.load(Ordering::SeqCst) <= 5);
    }

    #[tokio::test]
    async fn test_failures_are_captured_per_item() {
        let keys = keys(6);

        let outcome = delete_in_windows(&keys, 2, |key| async move {
            if key.ends_with("3.jpg") {
                Err(AppError::service_unavailable("remote store down"))
            } else {
                Ok(true)
            }
        })
        .await;

        assert_eq!(outcome.succeeded.len(), 5);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].key, "r/file-3.jpg");
        assert!(outcome.failed[0].message.contains("remote store down"));
    }

    #[tokio::test]
    async fn test_absent_keys_count_as_success_but_not_removal() {
        let keys = keys(3);

        let outcome = delete_in_windows(&keys, 5, |key| async move {
            Ok(!key.ends_with("0.jpg"))
        })
        .await;

        assert_eq!(outcome.succeeded.len(), 3);
        assert_eq!(outcome.removed_remote, 2);
    }
}
