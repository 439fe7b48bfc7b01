// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::Transform;
use async_trait::async_trait;
use cellflow_core::{
    tap_weak, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeValue, Subscription,
};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Transforms values and drops the ones that map to `None`.
///
/// Dropping values can leave the node without a current value even though its
/// upstream has one: a subscriber that taps it is not guaranteed an initial value.
pub struct CompactMap<S: NodeValue, U: NodeValue> {
    outlet: CachingCore<U>,
    transform: Transform<S, Option<U>>,
    upstream: Mutex<Option<Subscription<S>>>,
}

impl<S: NodeValue, U: NodeValue> CompactMap<S, U> {
    pub(crate) async fn attach<N>(source: &Arc<N>, transform: Transform<S, Option<U>>) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let cache = CurrentValue::from_upstream(source.current_value().is_some());
        Self::attach_with_cache(source, transform, cache).await
    }

    /// Like `attach`, with the initial cache chosen by the caller.
    pub(crate) async fn attach_with_cache<N>(
        source: &Arc<N>,
        transform: Transform<S, Option<U>>,
        cache: CurrentValue<U>,
    ) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(cache),
            transform,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            if let Some(mapped) = node.transform.apply(value).await {
                node.outlet.emit(mapped).await;
            }
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<S: NodeValue, U: NodeValue> Node for CompactMap<S, U> {
    type Value = U;

    fn core(&self) -> &NodeCore<U> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<U> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait CompactMapExt: NodeExt {
    async fn compact_map<U, F>(&self, transform: F) -> Arc<CompactMap<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Self::Value) -> Option<U> + Send + Sync + 'static;

    async fn compact_map_async<U, F, Fut>(&self, transform: F) -> Arc<CompactMap<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<U>> + Send + 'static;
}

#[async_trait]
impl<N: Node> CompactMapExt for Arc<N> {
    async fn compact_map<U, F>(&self, transform: F) -> Arc<CompactMap<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(N::Value) -> Option<U> + Send + Sync + 'static,
    {
        CompactMap::attach(self, Transform::sync(transform)).await
    }

    async fn compact_map_async<U, F, Fut>(&self, transform: F) -> Arc<CompactMap<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<U>> + Send + 'static,
    {
        CompactMap::attach(self, Transform::from_async(transform)).await
    }
}

/// Drop the `None`s of a node of optional values.
#[async_trait]
pub trait CompactExt<U: NodeValue> {
    async fn compact(&self) -> Arc<CompactMap<Option<U>, U>>;
}

#[async_trait]
impl<N, U> CompactExt<U> for Arc<N>
where
    N: Node<Value = Option<U>>,
    U: NodeValue,
{
    async fn compact(&self) -> Arc<CompactMap<Option<U>, U>> {
        CompactMap::attach(self, Transform::sync(|value| value)).await
    }
}
