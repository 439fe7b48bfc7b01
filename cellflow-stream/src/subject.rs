// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Mutable leaf node that always has a current value.

use cellflow_core::{Node, NodeCore, NodeValue};
use parking_lot::Mutex;
use std::sync::Arc;

/// Leaf node holding a value that can be replaced or mutated.
///
/// Writes update the stored value and deliver it within one acquisition of the
/// delivery lock, so a concurrent [`tap`](cellflow_core::NodeExt::tap) sees either
/// the old value followed by the new one, or only the new one.
///
/// # Example
///
/// ```
/// use cellflow_core::NodeExt;
/// use cellflow_stream::Subject;
///
/// # #[tokio::main]
/// # async fn main() {
/// let temperature = Subject::new(20);
///
/// let _subscription = temperature
///     .tap(|celsius| async move { println!("{celsius} °C") })
///     .await;
///
/// temperature.set(21).await;
/// let previous = temperature.mutate(|celsius| std::mem::replace(celsius, 22)).await;
///
/// assert_eq!(previous, 21);
/// assert_eq!(temperature.value(), 22);
/// # }
/// ```
#[derive(Debug)]
pub struct Subject<V: NodeValue> {
    core: NodeCore<V>,
    value: Mutex<V>,
}

impl<V: NodeValue> Subject<V> {
    pub fn new(value: V) -> Arc<Self> {
        Arc::new(Self {
            core: NodeCore::new(),
            value: Mutex::new(value),
        })
    }

    /// Snapshot of the stored value.
    pub fn value(&self) -> V {
        self.value.lock().clone()
    }

    /// Replace the value and deliver it.
    pub async fn set(&self, value: V) {
        self.core
            .send_updating(value, |v| *self.value.lock() = v.clone())
            .await;
    }

    /// Mutate the value in place, deliver the result and return what `body` returned.
    pub async fn mutate<R, F>(&self, body: F) -> R
    where
        F: FnOnce(&mut V) -> R + Send,
        R: Send,
    {
        let guard = self.core.lock().await;
        let (result, value) = {
            let mut value = self.value.lock();
            let result = body(&mut value);
            (result, value.clone())
        };
        self.core.deliver(&guard, value).await;
        result
    }
}

impl<V: NodeValue + Default> Subject<V> {
    /// Subject starting from `V::default()`, e.g. `None` for optional values.
    pub fn empty() -> Arc<Self> {
        Self::new(V::default())
    }
}

impl<V: NodeValue> Node for Subject<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        &self.core
    }

    fn current_value(&self) -> Option<V> {
        Some(self.value())
    }
}
