// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{CancellationToken, Node, NodeExt, NodeTask, NodeValue, Result, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::future::{ready, Future};
use std::sync::Arc;

/// Subscription running one task per value, cancelling the task of the previous
/// value.
///
/// Dropping it unsubscribes and cancels the running task.
#[must_use = "a task subscription is cancelled as soon as it is dropped"]
pub struct TaskSubscription<V: NodeValue> {
    current: Arc<Mutex<Option<NodeTask>>>,
    _subscription: Subscription<V>,
}

impl<V: NodeValue> TaskSubscription<V> {
    /// Whether the task for the latest value is still running.
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Cancel the running task, if any. Later values still start new tasks.
    pub fn cancel_current(&self) {
        if let Some(task) = self.current.lock().take() {
            task.cancel();
        }
    }
}

impl<V: NodeValue> fmt::Debug for TaskSubscription<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSubscription")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Extension trait providing `spawn_latest` for nodes.
#[async_trait]
pub trait SpawnLatestExt: NodeExt {
    /// Run `execute` for the current value and every value after it, each in its own
    /// task.
    ///
    /// A new value cancels the task of the previous one through its
    /// [`CancellationToken`]; the task also stops at its next suspension point.
    /// Failures are logged, a failed task does not stop later ones.
    ///
    /// # Example
    ///
    /// ```
    /// use cellflow_exec::SpawnLatestExt;
    /// use cellflow_stream::Subject;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let query = Subject::new(String::from("rust"));
    /// let search = query
    ///     .spawn_latest(|text, cancel| async move {
    ///         cancel.check()?;
    ///         println!("searching for {text}");
    ///         Ok(())
    ///     })
    ///     .await;
    ///
    /// query.set(String::from("rust async")).await;
    /// drop(search);
    /// # }
    /// ```
    async fn spawn_latest<F, Fut>(&self, execute: F) -> TaskSubscription<Self::Value>
    where
        F: Fn(Self::Value, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static;
}

#[async_trait]
impl<N: Node> SpawnLatestExt for Arc<N> {
    async fn spawn_latest<F, Fut>(&self, execute: F) -> TaskSubscription<N::Value>
    where
        F: Fn(N::Value, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let current = Arc::new(Mutex::new(None::<NodeTask>));
        let slot = Arc::clone(&current);
        let execute = Arc::new(execute);

        let subscription = self
            .tap(move |value| {
                let execute = Arc::clone(&execute);
                let task = NodeTask::spawn(move |cancel| async move {
                    match execute(value, cancel).await {
                        Ok(()) => {}
                        Err(error) if error.is_cancelled() => {
                            debug!("spawn_latest: task observed its cancellation");
                        }
                        Err(error) => warn!("spawn_latest: task failed: {}", error),
                    }
                });
                // Dropping the previous handle cancels its task
                let previous = slot.lock().replace(task);
                drop(previous);
                ready(())
            })
            .await;

        TaskSubscription {
            current,
            _subscription: subscription,
        }
    }
}
