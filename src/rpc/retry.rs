//! Backoff and timeout helpers for RPC calls

use crate::errors::RpcResult;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

/// `min(current * multiplier, max_backoff_seconds)`
///
/// ```
/// use std::time::Duration;
/// use blockindex::rpc::calculate_next_backoff;
///
/// let next = calculate_next_backoff(Duration::from_millis(100), 2.0, 30);
/// assert_eq!(next, Duration::from_millis(200));
/// ```
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Run a blocking RPC call on the blocking pool under a timeout
///
/// Outer `Err` is the timeout, middle `Err` a failed task, inner the call's own result.
pub async fn execute_with_timeout<T, F>(
    timeout_seconds: u64,
    operation: F,
) -> Result<Result<RpcResult<T>, JoinError>, Elapsed>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    timeout(
        Duration::from_secs(timeout_seconds),
        tokio::task::spawn_blocking(operation),
    )
    .await
}
