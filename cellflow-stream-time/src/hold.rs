// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{
    tap_weak, AsyncLock, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeTask,
    Subscription,
};
use cellflow_runtime::{TokioTimer, Timer};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Keeps a `true` for at least `interval` after it was switched off.
///
/// A `true` passes immediately. A `false` following a `true` is delayed by
/// `interval` and dropped if another `true` arrives in the meantime. A `false`
/// following a `false` passes immediately.
///
/// The node keeps a current value once it has emitted, whatever its upstream does.
pub struct Hold<T: Timer = TokioTimer> {
    outlet: CachingCore<bool>,
    interval: Duration,
    timer: T,
    gate: AsyncLock,
    release: Mutex<Option<NodeTask>>,
    upstream: Mutex<Option<Subscription<bool>>>,
}

impl<T: Timer> Hold<T> {
    pub(crate) async fn attach<N>(source: &Arc<N>, interval: Duration, timer: T) -> Arc<Self>
    where
        N: Node<Value = bool>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Pending),
            interval,
            timer,
            gate: AsyncLock::new(),
            release: Mutex::new(None),
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            node.on_upstream(value).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }

    async fn on_upstream(self: &Arc<Self>, value: bool) {
        let _gate = self.gate.lock().await;

        if value {
            if self.release.lock().take().is_some() {
                debug!("hold: pending release cancelled");
            }
            self.outlet.emit(true).await;
        } else if self.outlet.current_value() == Some(true) {
            let mut release = self.release.lock();
            if release.is_none() {
                *release = Some(Self::spawn_release(
                    Arc::downgrade(self),
                    self.timer.clone(),
                    self.interval,
                ));
            }
        } else {
            self.outlet.emit(false).await;
        }
    }

    fn spawn_release(node: Weak<Self>, timer: T, interval: Duration) -> NodeTask {
        NodeTask::spawn(move |_cancel| async move {
            timer.sleep_future(interval).await;

            let Some(this) = node.upgrade() else {
                return;
            };
            let _gate = this.gate.lock().await;
            this.outlet.emit(false).await;
            // Last step: dropping the handle cancels this very task
            let finished = this.release.lock().take();
            drop(finished);
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<T: Timer> Node for Hold<T> {
    type Value = bool;

    fn core(&self) -> &NodeCore<bool> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<bool> {
        self.outlet.current_value()
    }
}

/// Extension trait providing the `hold` operator for `bool` nodes.
#[async_trait]
pub trait HoldExt {
    async fn hold(&self, interval: Duration) -> Arc<Hold>;

    async fn hold_with_timer<T: Timer>(&self, interval: Duration, timer: T) -> Arc<Hold<T>>;
}

#[async_trait]
impl<N> HoldExt for Arc<N>
where
    N: Node<Value = bool>,
{
    async fn hold(&self, interval: Duration) -> Arc<Hold> {
        Hold::attach(self, interval, TokioTimer).await
    }

    async fn hold_with_timer<T: Timer>(&self, interval: Duration, timer: T) -> Arc<Hold<T>> {
        Hold::attach(self, interval, timer).await
    }
}
