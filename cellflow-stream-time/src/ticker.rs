// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic `()` emitter.

use cellflow_core::{Node, NodeCore, NodeTask};
use cellflow_runtime::{TokioTimer, Timer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Leaf node emitting `()` every `interval`.
///
/// The first tick happens one `interval` after construction. With `prevent_drift`,
/// every next deadline is the previous deadline plus `interval`, so slow subscribers
/// do not make the ticker fall behind; without it the next deadline is measured from
/// the end of the previous delivery. A ticker without `repeat` ticks once.
///
/// A ticker has no current value. Its task is cancelled when the node is dropped.
///
/// # Example
///
/// ```
/// use cellflow_core::NodeExt;
/// use cellflow_stream_time::Ticker;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let ticker = Ticker::new(Duration::from_millis(10));
/// let _subscription = ticker.subscribe(|()| async { println!("tick") });
/// # }
/// ```
#[derive(Debug)]
pub struct Ticker {
    core: NodeCore<()>,
    interval: Duration,
    task: Mutex<Option<NodeTask>>,
}

impl Ticker {
    /// Repeating, drift-free ticker on the tokio clock.
    pub fn new(interval: Duration) -> Arc<Self> {
        Self::with_options(interval, true, true, TokioTimer)
    }

    /// # Arguments
    ///
    /// * `interval` - Time between two ticks
    /// * `prevent_drift` - Schedule from the previous deadline instead of from now
    /// * `repeat` - Keep ticking after the first tick
    /// * `timer` - Clock used for deadlines and sleeping
    pub fn with_options<T: Timer>(
        interval: Duration,
        prevent_drift: bool,
        repeat: bool,
        timer: T,
    ) -> Arc<Self> {
        let node = Arc::new(Self {
            core: NodeCore::new(),
            interval,
            task: Mutex::new(None),
        });

        let weak = Arc::downgrade(&node);
        let task = NodeTask::spawn(move |_cancel| async move {
            let mut deadline = timer.now() + interval;
            loop {
                timer.sleep_until(deadline).await;

                let Some(node) = weak.upgrade() else {
                    return;
                };
                node.core.send(()).await;
                drop(node);

                if !repeat {
                    return;
                }
                deadline = if prevent_drift {
                    deadline + interval
                } else {
                    timer.now() + interval
                };
            }
        });
        *node.task.lock() = Some(task);

        node
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the ticker stopped ticking (single tick delivered).
    pub fn is_finished(&self) -> bool {
        self.task.lock().as_ref().is_some_and(NodeTask::is_finished)
    }
}

impl Node for Ticker {
    type Value = ();

    fn core(&self) -> &NodeCore<()> {
        &self.core
    }

    fn current_value(&self) -> Option<()> {
        None
    }
}
