// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

type Combine<S, U> = Box<dyn Fn(Option<&S>, &S) -> U + Send + Sync>;

/// Emits a value computed from the previous and the current upstream value.
///
/// The previous value is `None` for the first upstream value.
pub struct SelfScan<S: NodeValue, U: NodeValue> {
    outlet: CachingCore<U>,
    previous: Mutex<Option<S>>,
    combine: Combine<S, U>,
    upstream: Mutex<Option<Subscription<S>>>,
}

impl<S: NodeValue, U: NodeValue> SelfScan<S, U> {
    pub(crate) async fn attach<N>(source: &Arc<N>, combine: Combine<S, U>) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            previous: Mutex::new(None),
            combine,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            let next = {
                let mut previous = node.previous.lock();
                let next = (node.combine)(previous.as_ref(), &value);
                *previous = Some(value);
                next
            };
            node.outlet.emit(next).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<S: NodeValue, U: NodeValue> Node for SelfScan<S, U> {
    type Value = U;

    fn core(&self) -> &NodeCore<U> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<U> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait SelfScanExt: NodeExt {
    async fn self_scan<U, F>(&self, combine: F) -> Arc<SelfScan<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Option<&Self::Value>, &Self::Value) -> U + Send + Sync + 'static;

    /// Pair every value with its predecessor.
    async fn with_previous(&self) -> Arc<SelfScan<Self::Value, (Option<Self::Value>, Self::Value)>>;
}

#[async_trait]
impl<N: Node> SelfScanExt for Arc<N> {
    async fn self_scan<U, F>(&self, combine: F) -> Arc<SelfScan<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(Option<&N::Value>, &N::Value) -> U + Send + Sync + 'static,
    {
        SelfScan::attach(self, Box::new(combine)).await
    }

    async fn with_previous(&self) -> Arc<SelfScan<N::Value, (Option<N::Value>, N::Value)>> {
        SelfScan::attach(
            self,
            Box::new(|previous: Option<&N::Value>, current: &N::Value| {
                (previous.cloned(), current.clone())
            }),
        )
        .await
    }
}
