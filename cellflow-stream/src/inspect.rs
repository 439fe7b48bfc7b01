// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Logging pass-through operator for troubleshooting node graphs.
//!
//! Insert [`inspect`](InspectExt::inspect) anywhere in a graph to log the values flowing
//! through that point. With the `tracing` feature the values go to `tracing::info!`,
//! otherwise to standard output.

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// Forwards every value unchanged after logging it under a label.
pub struct Inspect<V: NodeValue> {
    outlet: CachingCore<V>,
    label: String,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue + Debug> Inspect<V> {
    pub(crate) async fn attach<N>(source: &Arc<N>, label: String) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let current = source.current_value();
        info!("{}: (initial value) {:?}", label, current);

        let node = Arc::new(Self {
            outlet: CachingCore::following(current.as_ref()),
            label,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            info!("{}: {:?}", node.label, value);
            node.outlet.emit(value).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<V: NodeValue> Node for Inspect<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait InspectExt: NodeExt
where
    Self::Value: Debug,
{
    async fn inspect(&self, label: &str) -> Arc<Inspect<Self::Value>>;
}

#[async_trait]
impl<N> InspectExt for Arc<N>
where
    N: Node,
    N::Value: Debug,
{
    async fn inspect(&self, label: &str) -> Arc<Inspect<N::Value>> {
        Inspect::attach(self, label.to_owned()).await
    }
}
