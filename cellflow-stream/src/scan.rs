// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stateful accumulation operator.
//!
//! ```
//! use cellflow_core::{Node, NodeExt};
//! use cellflow_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let deposits = Relay::<u32>::new();
//! let balance = deposits.scan(100, |balance, deposit| balance + deposit).await;
//!
//! deposits.send(20).await;
//! deposits.send(5).await;
//!
//! // A relay has no current value, so neither has the running total
//! assert_eq!(balance.current_value(), None);
//! # }
//! ```

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

type Accumulate<S, U> = Box<dyn Fn(&U, S) -> U + Send + Sync>;

/// Emits the running accumulation of upstream values, starting from a seed.
pub struct Scan<S: NodeValue, U: NodeValue> {
    outlet: CachingCore<U>,
    accumulator: Mutex<U>,
    accumulate: Accumulate<S, U>,
    upstream: Mutex<Option<Subscription<S>>>,
}

impl<S: NodeValue, U: NodeValue> Scan<S, U> {
    pub(crate) async fn attach<N>(source: &Arc<N>, seed: U, accumulate: Accumulate<S, U>) -> Arc<Self>
    where
        N: Node<Value = S>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            accumulator: Mutex::new(seed),
            accumulate,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            let next = {
                let mut accumulator = node.accumulator.lock();
                let next = (node.accumulate)(&accumulator, value);
                *accumulator = next.clone();
                next
            };
            node.outlet.emit(next).await;
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<S: NodeValue, U: NodeValue> Node for Scan<S, U> {
    type Value = U;

    fn core(&self) -> &NodeCore<U> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<U> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait ScanExt: NodeExt {
    /// Fold every value into an accumulator and emit the accumulator.
    ///
    /// # Arguments
    ///
    /// * `seed` - Initial accumulator, not emitted by itself
    /// * `accumulate` - Computes the next accumulator from the previous one and a value
    async fn scan<U, F>(&self, seed: U, accumulate: F) -> Arc<Scan<Self::Value, U>>
    where
        U: NodeValue,
        F: Fn(&U, Self::Value) -> U + Send + Sync + 'static;
}

#[async_trait]
impl<N: Node> ScanExt for Arc<N> {
    async fn scan<U, F>(&self, seed: U, accumulate: F) -> Arc<Scan<N::Value, U>>
    where
        U: NodeValue,
        F: Fn(&U, N::Value) -> U + Send + Sync + 'static,
    {
        Scan::attach(self, seed, Box::new(accumulate)).await
    }
}
