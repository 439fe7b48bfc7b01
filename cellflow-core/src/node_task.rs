// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background work owned by a node.
//!
//! Delayed emissions (debounce, throttle), periodic tickers and stream relays all run
//! as tasks whose lifetime is bounded by the node that spawned them.

use crate::CancellationToken;
use std::future::Future;
use tokio::task::JoinHandle;

/// Spawned task with cooperative cancellation on drop.
///
/// The closure receives a [`CancellationToken`]. The spawned future is also raced
/// against that token, so a task that never looks at it still stops at its next
/// suspension point once the `NodeTask` is cancelled or dropped.
///
/// # Example
///
/// ```rust
/// use cellflow_core::NodeTask;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = NodeTask::spawn(|cancel| async move {
///     while !cancel.is_cancelled() {
///         tokio::time::sleep(Duration::from_millis(10)).await;
///     }
/// });
///
/// // Cancels the loop
/// drop(task);
/// # }
/// ```
#[derive(Debug)]
pub struct NodeTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl NodeTask {
    /// Spawn a background task on the tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that receives the task's `CancellationToken` and returns its future
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let future = f(cancel.clone());

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!("node task cancelled");
                }
                () = future => {}
            }
        });

        Self { cancel, handle }
    }

    /// Manually cancel the task.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the task has run to completion (or observed its cancellation).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the task has finished without cancelling it.
    pub async fn join(mut self) {
        // A panicking task surfaces here as a JoinError, nothing to hand back
        let _ = (&mut self.handle).await;
    }
}

impl Drop for NodeTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
