// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Value transformation operator.
//!
//! [`map`](MapExt::map) applies a closure to every upstream value. The mapped node has
//! a current value exactly when its upstream has one: the upstream's current value is
//! transformed at construction time and every later emission replaces it.
//!
//! ```
//! use cellflow_core::{Node, NodeExt};
//! use cellflow_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let celsius = Subject::new(20.0_f64);
//! let fahrenheit = celsius.map(|c| c * 9.0 / 5.0 + 32.0).await;
//!
//! assert_eq!(fahrenheit.current_value(), Some(68.0));
//!
//! celsius.set(100.0).await;
//! assert_eq!(fahrenheit.current_value(), Some(212.0));
//! # }
//! ```

use crate::transform::Transform;
use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

pub struct Map<S: NodeValue, U: NodeValue> {
    outlet: CachingCore<U>,
    transform: Transform<S, U>,
    upstream: Mutex<Option<Subscription<S>>>,
}

impl<S: NodeValue, U: NodeValue> Map<S, U> {
    pub(crate) async fn attach<N>(source: &Arc<N>, transform: Transform<S, U>) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            transform,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            let mapped = node.transform.apply(value).await;
            node.outlet.emit(mapped).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<S: NodeValue, U: NodeValue> Node for Map<S, U> {
    type Value = U;

    fn core(&self) -> &NodeCore<U> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<U> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait MapExt: NodeExt {
    /// Transform every value with `transform`.
    async fn map<U, F>(&self, transform: F) -> Arc<Map<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Self::Value) -> U + Send + Sync + 'static;

    /// Transform every value with an async `transform`.
    ///
    /// The next upstream value is not processed before the future has completed.
    async fn map_async<U, F, Fut>(&self, transform: F) -> Arc<Map<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static;
}

#[async_trait]
impl<N: Node> MapExt for Arc<N> {
    async fn map<U, F>(&self, transform: F) -> Arc<Map<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(N::Value) -> U + Send + Sync + 'static,
    {
        Map::attach(self, Transform::sync(transform)).await
    }

    async fn map_async<U, F, Fut>(&self, transform: F) -> Arc<Map<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        Map::attach(self, Transform::from_async(transform)).await
    }
}
