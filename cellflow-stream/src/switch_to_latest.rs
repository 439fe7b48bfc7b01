// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Follows whichever inner node the outer node currently points at.
//!
//! The outer node emits nodes. Every time it does, [`SwitchToLatest`] drops its
//! subscription to the previous inner node and taps the new one, so the new inner
//! node's current value (if any) is forwarded right away.
//!
//! Each inner subscription carries the generation it was created for. Forwarding
//! checks the generation under the switch lock, and the switch bumps it under the
//! same lock: once a switch has happened, nothing the previous inner node emits
//! reaches downstream, even if its delivery was already in flight.
//!
//! # Example
//!
//! ```
//! use cellflow_core::Node;
//! use cellflow_stream::prelude::*;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let celsius = Subject::new(20);
//! let kelvin = Subject::new(293);
//! let selected = Subject::new(Arc::clone(&celsius));
//!
//! let reading = selected.switch_to_latest().await;
//! assert_eq!(reading.current_value(), Some(20));
//!
//! selected.set(Arc::clone(&kelvin)).await;
//! celsius.set(25).await;
//! assert_eq!(reading.current_value(), Some(293));
//! # }
//! ```

use crate::map::MapExt;
use async_trait::async_trait;
use cellflow_core::{
    tap_weak, AsyncLock, CachingCore, CurrentValue, Node, NodeCore, NodeExt, Subscription,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Node forwarding the values of the latest inner node.
///
/// Values are forwarded while the switch lock is held. A subscriber of this node must
/// therefore not make the outer node or the current inner node emit from inside its
/// callback: both wait for the switch lock, which that very callback keeps held. Debug builds panic with a deadlock
/// diagnostic instead of hanging. Spawn a task for such feedback instead.
pub struct SwitchToLatest<I: Node> {
    outlet: CachingCore<I::Value>,
    switch: AsyncLock,
    generation: AtomicU64,
    inner: Mutex<Option<Subscription<I::Value>>>,
    outer: Mutex<Option<Subscription<Arc<I>>>>,
}

impl<I: Node> SwitchToLatest<I> {
    pub(crate) async fn attach<N>(source: &Arc<N>) -> Arc<Self>
    where
        N: Node<Value = Arc<I>>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Untracked),
            switch: AsyncLock::new().with_deadlock_detection(),
            generation: AtomicU64::new(0),
            inner: Mutex::new(None),
            outer: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, inner| async move {
            node.on_outer(inner).await;
        })
        .await;
        *node.outer.lock() = Some(subscription);

        node
    }

    async fn on_outer(self: &Arc<Self>, inner: Arc<I>) {
        // Switches are serialized by the outer delivery lock. The switch lock is
        // not held while tapping the new inner node.
        let (generation, previous) = {
            let _switch = self.switch.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            (generation, self.inner.lock().take())
        };
        drop(previous);

        if inner.current_value().is_some() {
            self.outlet.track();
        }

        let subscription = tap_weak(&inner, self, move |node, value| async move {
            node.on_inner(generation, value).await;
        })
        .await;

        if self.generation.load(Ordering::Acquire) == generation {
            *self.inner.lock() = Some(subscription);
        }
    }

    async fn on_inner(&self, generation: u64, value: I::Value) {
        let switch = self.switch.lock().await;
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("switch_to_latest: dropped value from a replaced inner node");
            return;
        }
        switch.scope(self.outlet.emit(value)).await;
    }

    /// Number of switches to a new inner node so far.
    pub fn switch_count(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl<I: Node> Node for SwitchToLatest<I> {
    type Value = I::Value;

    fn core(&self) -> &NodeCore<I::Value> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<I::Value> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait SwitchToLatestExt<I: Node> {
    /// Forward the values of the inner node most recently emitted by this node.
    async fn switch_to_latest(&self) -> Arc<SwitchToLatest<I>>;
}

#[async_trait]
impl<N, I> SwitchToLatestExt<I> for Arc<N>
where
    N: Node<Value = Arc<I>>,
    I: Node,
{
    async fn switch_to_latest(&self) -> Arc<SwitchToLatest<I>> {
        SwitchToLatest::attach(self).await
    }
}

#[async_trait]
pub trait MapToLatestExt: NodeExt {
    /// Build an inner node per value with `build`, then follow the latest one.
    async fn map_to_latest<I, F, Fut>(&self, build: F) -> Arc<SwitchToLatest<I>>
    where
        I: Node,
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Arc<I>> + Send + 'static;
}

#[async_trait]
impl<N: Node> MapToLatestExt for Arc<N> {
    async fn map_to_latest<I, F, Fut>(&self, build: F) -> Arc<SwitchToLatest<I>>
    where
        I: Node,
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Arc<I>> + Send + 'static,
    {
        self.map_async(build).await.switch_to_latest().await
    }
}
