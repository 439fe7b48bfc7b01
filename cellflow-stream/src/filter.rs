// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::Transform;
use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Forwards the upstream values that satisfy a predicate.
///
/// The current value is the last value that passed, if the upstream keeps one. When
/// the upstream's current value is rejected there is no current value until the
/// first accepted one.
pub struct Filter<V: NodeValue> {
    outlet: CachingCore<V>,
    predicate: Transform<V, bool>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> Filter<V> {
    pub(crate) async fn attach<N>(source: &Arc<N>, predicate: Transform<V, bool>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            predicate,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            if node.predicate.apply(value.clone()).await {
                node.outlet.emit(value).await;
            }
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<V: NodeValue> Node for Filter<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait FilterExt: NodeExt {
    async fn filter<F>(&self, predicate: F) -> Arc<Filter<Self::Value>>
    where
        F: Fn(&Self::Value) -> bool + Send + Sync + 'static;

    async fn filter_async<F, Fut>(&self, predicate: F) -> Arc<Filter<Self::Value>>
    where
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static;
}

#[async_trait]
impl<N: Node> FilterExt for Arc<N> {
    async fn filter<F>(&self, predicate: F) -> Arc<Filter<N::Value>>
    where
        F: Fn(&N::Value) -> bool + Send + Sync + 'static,
    {
        Filter::attach(self, Transform::sync(move |value: N::Value| predicate(&value))).await
    }

    async fn filter_async<F, Fut>(&self, predicate: F) -> Arc<Filter<N::Value>>
    where
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Filter::attach(self, Transform::from_async(predicate)).await
    }
}
