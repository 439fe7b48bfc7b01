// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{
    tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeTask, NodeValue, Subscription,
};
use cellflow_runtime::{TokioTimer, Timer};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

struct DebounceState<V, I> {
    pending: Option<V>,
    deadline: Option<I>,
    scheduled: bool,
    task: Option<NodeTask>,
}

/// Emits the latest upstream value once no newer one arrived for `interval`.
///
/// This implements **trailing debounce** semantics:
/// - Each upstream value replaces the pending one and moves the deadline to
///   `now + interval`
/// - A single delayed task sleeps until the deadline, sleeps again if it moved, and
///   emits the pending value otherwise
///
/// The node has a current value only if its upstream had one, and only after its
/// first own emission. The delayed task is cancelled when the node is dropped.
pub struct Debounce<V: NodeValue, T: Timer = TokioTimer> {
    outlet: CachingCore<V>,
    interval: Duration,
    timer: T,
    state: Mutex<DebounceState<V, T::Instant>>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue, T: Timer> Debounce<V, T> {
    pub(crate) async fn attach<N>(source: &Arc<N>, interval: Duration, timer: T) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            interval,
            timer,
            state: Mutex::new(DebounceState {
                pending: None,
                deadline: None,
                scheduled: false,
                task: None,
            }),
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            node.on_upstream(value);
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }

    fn on_upstream(self: &Arc<Self>, value: V) {
        let mut state = self.state.lock();
        state.pending = Some(value);
        state.deadline = Some(self.timer.now() + self.interval);
        if !state.scheduled {
            state.scheduled = true;
            state.task = Some(Self::spawn_emitter(Arc::downgrade(self), self.timer.clone()));
        }
    }

    fn spawn_emitter(node: Weak<Self>, timer: T) -> NodeTask {
        NodeTask::spawn(move |_cancel| async move {
            loop {
                let Some(deadline) = node.upgrade().and_then(|this| this.state.lock().deadline)
                else {
                    return;
                };
                timer.sleep_until(deadline).await;

                let Some(this) = node.upgrade() else {
                    return;
                };
                let value = {
                    let mut state = this.state.lock();
                    if state.deadline.is_some_and(|deadline| deadline > timer.now()) {
                        debug!("debounce: deadline moved while sleeping");
                        continue;
                    }
                    match state.pending.take() {
                        Some(value) => value,
                        None => {
                            state.scheduled = false;
                            return;
                        }
                    }
                };

                this.outlet.emit(value).await;

                {
                    let mut state = this.state.lock();
                    if state.pending.is_none() {
                        state.scheduled = false;
                        return;
                    }
                }
            }
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<V: NodeValue, T: Timer> Node for Debounce<V, T> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

/// Extension trait providing the `debounce` operator for nodes.
#[async_trait]
pub trait DebounceExt: NodeExt {
    /// Debounce with the tokio clock.
    ///
    /// # Arguments
    ///
    /// * `interval` - The duration of required inactivity before emitting a value
    async fn debounce(&self, interval: Duration) -> Arc<Debounce<Self::Value>>;

    /// Debounce with a custom clock.
    async fn debounce_with_timer<T: Timer>(
        &self,
        interval: Duration,
        timer: T,
    ) -> Arc<Debounce<Self::Value, T>>;
}

#[async_trait]
impl<N: Node> DebounceExt for Arc<N> {
    async fn debounce(&self, interval: Duration) -> Arc<Debounce<N::Value>> {
        Debounce::attach(self, interval, TokioTimer).await
    }

    async fn debounce_with_timer<T: Timer>(
        &self,
        interval: Duration,
        timer: T,
    ) -> Arc<Debounce<N::Value, T>> {
        Debounce::attach(self, interval, timer).await
    }
}
