// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use cellflow_core::{tap_weak, CachingCore, Node, NodeCore, NodeExt, NodeValue, Subscription};
use parking_lot::Mutex;
use std::sync::Arc;

type IsDuplicate<V> = Box<dyn Fn(&V, &V) -> bool + Send + Sync>;

/// Suppresses values equal to the immediately preceding upstream value.
///
/// Comparison is against the last *upstream* value, not the last emitted one, so a
/// slowly drifting value is never suppressed as a whole.
pub struct RemoveDuplicates<V: NodeValue> {
    outlet: CachingCore<V>,
    recent: Mutex<Option<V>>,
    is_duplicate: IsDuplicate<V>,
    upstream: Mutex<Option<Subscription<V>>>,
}

impl<V: NodeValue> RemoveDuplicates<V> {
    pub(crate) async fn attach<N>(source: &Arc<N>, is_duplicate: IsDuplicate<V>) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::following(source.current_value().as_ref()),
            recent: Mutex::new(None),
            is_duplicate,
            upstream: Mutex::new(None),
        });

        let subscription = tap_weak(source, &node, |node, value| async move {
            let duplicate = {
                let mut recent = node.recent.lock();
                let duplicate = recent
                    .as_ref()
                    .is_some_and(|recent| (node.is_duplicate)(recent, &value));
                *recent = Some(value.clone());
                duplicate
            };
            if !duplicate {
                node.outlet.emit(value).await;
            }
        })
        .await;
        *node.upstream.lock() = Some(subscription);

        node
    }
}

impl<V: NodeValue> Node for RemoveDuplicates<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait RemoveDuplicatesExt: NodeExt {
    /// Suppress consecutive values for which `is_duplicate(previous, next)` holds.
    async fn remove_duplicates_by<F>(&self, is_duplicate: F) -> Arc<RemoveDuplicates<Self::Value>>
    where
        F: Fn(&Self::Value, &Self::Value) -> bool + Send + Sync + 'static;

    /// Suppress consecutive equal values.
    async fn remove_duplicates(&self) -> Arc<RemoveDuplicates<Self::Value>>
    where
        Self::Value: PartialEq;
}

#[async_trait]
impl<N: Node> RemoveDuplicatesExt for Arc<N> {
    async fn remove_duplicates_by<F>(&self, is_duplicate: F) -> Arc<RemoveDuplicates<N::Value>>
    where
        F: Fn(&N::Value, &N::Value) -> bool + Send + Sync + 'static,
    {
        RemoveDuplicates::attach(self, Box::new(is_duplicate)).await
    }

    async fn remove_duplicates(&self) -> Arc<RemoveDuplicates<N::Value>>
    where
        N::Value: PartialEq,
    {
        RemoveDuplicates::attach(self, Box::new(|a: &N::Value, b: &N::Value| a == b)).await
    }
}
