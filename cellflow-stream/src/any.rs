// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{
    tap_weak, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeValue, Subscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Type-erased node: forwards the values of any node with value type `V`.
///
/// Used to put nodes of different concrete types behind one type, e.g. in a `Vec`
/// or as the result of a branch.
///
/// # Example
///
/// ```
/// use cellflow_core::Node;
/// use cellflow_stream::prelude::*;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let fixed = Constant::new(1).any().await;
/// let live = Subject::new(2).any().await;
///
/// let nodes: Vec<Arc<AnyNode<i32>>> = vec![fixed, live];
/// assert_eq!(nodes[1].current_value(), Some(2));
/// # }
/// ```
pub struct AnyNode<V: NodeValue> {
    outlet: CachingCore<V>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> AnyNode<V> {
    pub async fn new<N>(source: &Arc<N>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let cache = CurrentValue::from_upstream(source.current_value().is_some());
        Self::with_cache(source, cache).await
    }

    pub(crate) async fn with_cache<N>(source: &Arc<N>, cache: CurrentValue<V>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(cache),
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            node.outlet.emit(value).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<V: NodeValue> Node for AnyNode<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait AnyExt: NodeExt {
    async fn any(&self) -> Arc<AnyNode<Self::Value>>;
}

#[async_trait]
impl<N: Node> AnyExt for Arc<N> {
    async fn any(&self) -> Arc<AnyNode<N::Value>> {
        AnyNode::new(self).await
    }
}
