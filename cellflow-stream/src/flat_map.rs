// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::Transform;
use cellflow_core::{subscribe_weak, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Expands every upstream value into a sequence of values, emitted one by one.
///
/// A flat-mapped node never has a current value: no single value stands for the
/// expansion of the upstream's current value.
pub struct FlatMap<S: NodeValue, U: NodeValue> {
    core: NodeCore<U>,
    transform: Transform<S, Vec<U>>,
    upstream: Mutex<Option<Subscription<S>>>,
}

impl<S: NodeValue, U: NodeValue> FlatMap<S, U> {
    pub(crate) fn attach<N>(source: &Arc<N>, transform: Transform<S, Vec<U>>) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let node = Arc::new(Self {
            core: NodeCore::new(),
            transform,
            upstream: Mutex::new(None),
        });

        let subscription = subscribe_weak(source, &node, |node, value| async move {
            for expanded in node.transform.apply(value).await {
                node.core.send(expanded).await;
            }
        });
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<S: NodeValue, U: NodeValue> Node for FlatMap<S, U> {
    type Value = U;

    fn core(&self) -> &NodeCore<U> {
        &self.core
    }

    fn current_value(&self) -> Option<U> {
        None
    }
}

pub trait FlatMapExt: NodeExt {
    fn flat_map<U, I, F>(&self, transform: F) -> Arc<FlatMap<Self::Value, U>>
    where
        U: NodeValue,
        I: IntoIterator<Item = U>,
        F: Fn(Self::Value) -> I + Send + Sync + 'static;

    fn flat_map_async<U, F, Fut>(&self, transform: F) -> Arc<FlatMap<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<U>> + Send + 'static;
}

impl<N: Node> FlatMapExt for Arc<N> {
    fn flat_map<U, I, F>(&self, transform: F) -> Arc<FlatMap<N::Value, U>>
    where
        U: NodeValue,
        I: IntoIterator<Item = U>,
        F: Fn(N::Value) -> I + Send + Sync + 'static,
    {
        let transform = move |value: N::Value| -> Vec<U> { transform(value).into_iter().collect() };
        FlatMap::attach(self, Transform::sync(transform))
    }

    fn flat_map_async<U, F, Fut>(&self, transform: F) -> Arc<FlatMap<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<U>> + Send + 'static,
    {
        FlatMap::attach(self, Transform::from_async(transform))
    }
}

/// Emit the elements of a node of vectors one by one.
pub trait FlattenExt<U: NodeValue> {
    fn flatten(&self) -> Arc<FlatMap<Vec<U>, U>>;
}

impl<N, U> FlattenExt<U> for Arc<N>
where
    N: Node<Value = Vec<U>>,
    U: NodeValue,
{
    fn flatten(&self) -> Arc<FlatMap<Vec<U>, U>> {
        FlatMap::attach(self, Transform::sync(|values| values))
    }
}
