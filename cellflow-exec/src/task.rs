// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Future helpers producing cellflow errors.

use cellflow_core::{CellflowError, Result};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;

/// Run `future`, failing if it takes longer than `duration`.
///
/// # Errors
/// Returns `Err(CellflowError::Timeout)` when `duration` elapses first. The future is
/// dropped at that point.
pub async fn with_timeout<F>(duration: Duration, future: F) -> Result<F::Output>
where
    F: Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| CellflowError::timeout(format!("no result within {duration:?}")))
}

/// Run all `futures` concurrently and collect their results in order.
///
/// Every future runs to completion, even after another one failed.
///
/// # Errors
/// Returns `Err(CellflowError::MultipleErrors)` carrying every failure if at least one
/// future failed.
///
/// # Example
///
/// ```
/// use cellflow_core::CellflowError;
/// use cellflow_exec::all;
///
/// # #[tokio::main]
/// # async fn main() {
/// let doubled = all((1..=3).map(|n| async move { Ok(n * 2) })).await;
/// assert_eq!(doubled.unwrap(), vec![2, 4, 6]);
///
/// let failed = all((1..=3).map(|n| async move {
///     if n == 2 {
///         Err(CellflowError::timeout("second"))
///     } else {
///         Ok(n)
///     }
/// }))
/// .await;
/// assert!(matches!(failed, Err(CellflowError::MultipleErrors { count: 1, .. })));
/// # }
/// ```
pub async fn all<I, F, T>(futures: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    let outcomes = join_all(futures).await;

    let mut values = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(value) => values.push(value),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        warn!("all: {} of {} futures failed", errors.len(), errors.len() + values.len());
        Err(CellflowError::aggregate(errors))
    }
}
