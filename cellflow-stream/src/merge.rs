// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{
    subscribe_weak, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeValue, Subscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Forwards the values of several upstream nodes of the same value type.
///
/// The initial current value is that of the last upstream (in attach order) that has
/// one. If none has, the merged node has no current value either.
pub struct Merge<V: NodeValue> {
    outlet: CachingCore<V>,
    upstream: Mutex<Vec<Subscription<V>>>,
}

impl<V: NodeValue> Merge<V> {
    /// An empty merge, see [`attach`](Self::attach).
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Untracked),
            upstream: Mutex::new(Vec::new()),
        })
    }

    /// Merge nodes of one concrete type.
    pub fn from_nodes<N>(sources: &[Arc<N>]) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let merge = Self::new();
        for source in sources {
            merge.attach(source);
        }
        merge
    }

    /// Add one more upstream node.
    pub fn attach<N>(self: &Arc<Self>, source: &Arc<N>)
    where
        N: Node<Value = V>,
    {
        let subscription = subscribe_weak(source, self, |node, value| async move {
            node.outlet.emit(value).await;
        });
        if let Some(current) = source.current_value() {
            self.outlet.seed(current);
        }
        self.upstream.lock().push(subscription);
    }

    pub fn upstream_count(&self) -> usize {
        self.upstream.lock().len()
    }
}

impl<V: NodeValue> Node for Merge<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

pub trait MergeExt: NodeExt {
    fn merge<M>(&self, other: &Arc<M>) -> Arc<Merge<Self::Value>>
    where
        M: Node<Value = Self::Value>;
}

impl<N: Node> MergeExt for Arc<N> {
    fn merge<M>(&self, other: &Arc<M>) -> Arc<Merge<N::Value>>
    where
        M: Node<Value = N::Value>,
    {
        let merge = Merge::new();
        merge.attach(self);
        merge.attach(other);
        merge
    }
}
