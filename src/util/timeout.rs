//! Timeout helpers.

use std::future::Future;
use std::time::Duration;

use crate::error::GraphError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, GraphError>>,
) -> Result<T, GraphError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(GraphError::Timeout(duration.as_millis() as u64)),
    }
}

/// Like [`with_timeout`], but `None` waits indefinitely.
pub async fn with_optional_timeout<T>(
    duration: Option<Duration>,
    future: impl Future<Output = Result<T, GraphError>>,
) -> Result<T, GraphError> {
    match duration {
        Some(duration) => with_timeout(duration, future).await,
        None => future.await,
    }
}
