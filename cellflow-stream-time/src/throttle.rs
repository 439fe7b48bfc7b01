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

struct ThrottleState<V, I> {
    last_emit: Option<I>,
    pending: Option<V>,
    scheduled: bool,
    task: Option<NodeTask>,
}

/// Rate-limits emissions to one per `interval`.
///
/// This implements **leading and trailing throttle** semantics:
/// - With `emit_immediately`, a value arriving at least `interval` after the previous
///   emission (and with no emission scheduled) is emitted right away
/// - Any other value becomes the pending value; a delayed task emits the latest
///   pending value once `interval` has passed since the previous emission
///
/// The node has a current value only if its upstream had one. The delayed task is
/// cancelled when the node is dropped.
pub struct Throttle<V: NodeValue, T: Timer = TokioTimer> {
    outlet: CachingCore<V>,
    interval: Duration,
    emit_immediately: bool,
    timer: T,
    state: Mutex<ThrottleState<V, T::Instant>>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue, T: Timer> Throttle<V, T> {
    pub(crate) async fn attach<N>(
        source: &Arc<N>,
        interval: Duration,
        emit_immediately: bool,
        timer: T,
    ) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            interval,
            emit_immediately,
            timer,
            state: Mutex::new(ThrottleState {
                last_emit: None,
                pending: None,
                scheduled: false,
                task: None,
            }),
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            node.on_upstream(value).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }

    async fn on_upstream(self: &Arc<Self>, value: V) {
        let immediate = {
            let mut state = self.state.lock();
            let rested = state
                .last_emit
                .is_none_or(|last| self.timer.elapsed_since(last) >= self.interval);

            if self.emit_immediately && rested && !state.scheduled {
                state.last_emit = Some(self.timer.now());
                Some(value)
            } else {
                state.pending = Some(value);
                if !state.scheduled {
                    state.scheduled = true;
                    state.task = Some(Self::spawn_emitter(Arc::downgrade(self), self.timer.clone()));
                }
                None
            }
        };

        if let Some(value) = immediate {
            self.outlet.emit(value).await;
        }
    }

    fn spawn_emitter(node: Weak<Self>, timer: T) -> NodeTask {
        NodeTask::spawn(move |_cancel| async move {
            loop {
                let Some(remaining) = node.upgrade().map(|this| this.remaining()) else {
                    return;
                };
                timer.sleep_future(remaining).await;

                let Some(this) = node.upgrade() else {
                    return;
                };
                let value = {
                    let mut state = this.state.lock();
                    match state.pending.take() {
                        Some(value) => {
                            state.last_emit = Some(timer.now());
                            value
                        }
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

    // Rest of the interval measured from the previous emission
    fn remaining(&self) -> Duration {
        let last_emit = self.state.lock().last_emit;
        let elapsed = last_emit.map_or(Duration::ZERO, |last| self.timer.elapsed_since(last));
        self.interval.saturating_sub(elapsed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn emits_immediately(&self) -> bool {
        self.emit_immediately
    }
}

impl<V: NodeValue, T: Timer> Node for Throttle<V, T> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

/// Extension trait providing the `throttle` operator for nodes.
#[async_trait]
pub trait ThrottleExt: NodeExt {
    /// Throttle with leading emission and the tokio clock.
    async fn throttle(&self, interval: Duration) -> Arc<Throttle<Self::Value>>;

    /// Throttle, choosing whether a rested node emits right away.
    ///
    /// # Arguments
    ///
    /// * `interval` - Minimum time between two emissions
    /// * `emit_immediately` - Emit a value at once when the previous emission is at
    ///   least `interval` old; otherwise every value waits for the trailing edge
    async fn throttle_with(
        &self,
        interval: Duration,
        emit_immediately: bool,
    ) -> Arc<Throttle<Self::Value>>;

    /// Throttle with a custom clock.
    async fn throttle_with_timer<T: Timer>(
        &self,
        interval: Duration,
        emit_immediately: bool,
        timer: T,
    ) -> Arc<Throttle<Self::Value, T>>;
}

#[async_trait]
impl<N: Node> ThrottleExt for Arc<N> {
    async fn throttle(&self, interval: Duration) -> Arc<Throttle<N::Value>> {
        Throttle::attach(self, interval, true, TokioTimer).await
    }

    async fn throttle_with(
        &self,
        interval: Duration,
        emit_immediately: bool,
    ) -> Arc<Throttle<N::Value>> {
        Throttle::attach(self, interval, emit_immediately, TokioTimer).await
    }

    async fn throttle_with_timer<T: Timer>(
        &self,
        interval: Duration,
        emit_immediately: bool,
        timer: T,
    ) -> Arc<Throttle<N::Value, T>> {
        Throttle::attach(self, interval, emit_immediately, timer).await
    }
}
