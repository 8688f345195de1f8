//! Cooperative cancellation at suspension points.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::GraphError;

/// Run `future` unless `cancel` fires first.
///
/// An already-cancelled token short-circuits without polling the future.
pub async fn run_cancellable<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T, GraphError>>,
) -> Result<T, GraphError> {
    if cancel.is_cancelled() {
        return Err(GraphError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GraphError::Cancelled),
        result = future => result,
    }
}
