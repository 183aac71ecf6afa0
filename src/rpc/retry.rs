//! Retry logic utilities for RPC operations
//!
//! Exponential backoff for rate-limited responses and a timeout wrapper for
//! individual HTTP round trips.

use std::future::Future;
use std::time::Duration;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

/// Calculate next backoff duration using exponential backoff with a maximum cap
///
/// `new_backoff = min(current_backoff * multiplier, max_backoff)`
///
/// # Example
/// ```
/// use std::time::Duration;
/// use burn_history_scanner::rpc::calculate_next_backoff;
///
/// let backoff = Duration::from_millis(100);
/// let next = calculate_next_backoff(backoff, 2.0, 30);
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

/// Run one RPC round trip under a timeout
///
/// # Returns
/// `Result<T, Elapsed>`: outer error means the timeout elapsed, `T` is the
/// operation's own result (usually an `RpcResult`).
///
/// # Example
/// ```no_run
/// use burn_history_scanner::rpc::execute_with_timeout;
/// use burn_history_scanner::errors::{RpcError, RpcResult};
///
/// async fn example() -> RpcResult<String> {
///     match execute_with_timeout(30, async { Ok::<_, RpcError>("result".to_string()) }).await {
///         Ok(result) => result,
///         Err(_) => Err(RpcError::Timeout { timeout_seconds: 30, operation: "example".into() }),
///     }
/// }
/// ```
pub async fn execute_with_timeout<T, F>(timeout_seconds: u64, operation: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    timeout(Duration::from_secs(timeout_seconds), operation).await
}
