// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Emits only the first upstream value (the current value, if there is one).
pub struct First<V: NodeValue> {
    outlet: CachingCore<V>,
    emitted: AtomicBool,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> First<V> {
    pub(crate) async fn attach<N>(source: &Arc<N>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            emitted: AtomicBool::new(false),
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            if !node.emitted.swap(true, Ordering::AcqRel) {
                node.outlet.emit(value).await;
                // Nothing more to forward
                node.upstream.lock().take();
            }
        })
        .await;

        if !node.emitted.load(Ordering::Acquire) {
            *node.upstream.lock() = Some(subscription);
        }

        node
    }
}

impl<V: NodeValue> Node for First<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait FirstExt: NodeExt {
    async fn first(&self) -> Arc<First<Self::Value>>;
}

#[async_trait]
impl<N: Node> FirstExt for Arc<N> {
    async fn first(&self) -> Arc<First<N::Value>> {
        First::attach(self).await
    }
}
