// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Predicate<V> = Box<dyn Fn(&V) -> bool + Send + Sync>;

/// Drops upstream values while a predicate holds, then forwards everything.
pub struct DropWhile<V: NodeValue> {
    outlet: CachingCore<V>,
    dropping: AtomicBool,
    predicate: Predicate<V>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> DropWhile<V> {
    pub(crate) async fn attach<N>(source: &Arc<N>, predicate: Predicate<V>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            dropping: AtomicBool::new(true),
            predicate,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            if node.dropping.load(Ordering::Acquire) {
                if (node.predicate)(&value) {
                    return;
                }
                node.dropping.store(false, Ordering::Release);
            }
            node.outlet.emit(value).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<V: NodeValue> Node for DropWhile<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait DropWhileExt: NodeExt {
    async fn drop_while<F>(&self, predicate: F) -> Arc<DropWhile<Self::Value>>
    where
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static;
}

#[async_trait]
impl<N: Node> DropWhileExt for Arc<N> {
    async fn drop_while<F>(&self, predicate: F) -> Arc<DropWhile<N::Value>>
    where
        F: Fn(&N::Value) -> bool + Send + Sync + 'static,
    {
        DropWhile::attach(self, Box::new(predicate)).await
    }
}
