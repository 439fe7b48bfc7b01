// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::current_value::CurrentValue;
use crate::node::{NodeCore, NodeValue};
use parking_lot::Mutex;

/// [`NodeCore`] paired with a [`CurrentValue`] cache.
///
/// [`emit`](Self::emit) updates the cache and delivers under the same lock
/// acquisition, which is what every caching operator needs.
#[derive(Debug)]
pub struct CachingCore<V: NodeValue> {
    core: NodeCore<V>,
    cache: Mutex<CurrentValue<V>>,
}

impl<V: NodeValue> CachingCore<V> {
    pub fn new(cache: CurrentValue<V>) -> Self {
        Self {
            core: NodeCore::new(),
            cache: Mutex::new(cache),
        }
    }

    /// Cache tracked only when the upstream reports a current value.
    pub fn following<U>(upstream_current: Option<&U>) -> Self {
        Self::new(CurrentValue::from_upstream(upstream_current.is_some()))
    }

    pub fn core(&self) -> &NodeCore<V> {
        &self.core
    }

    pub fn current_value(&self) -> Option<V> {
        self.cache.lock().get()
    }

    pub fn is_tracked(&self) -> bool {
        self.cache.lock().is_tracked()
    }

    /// Start tracking a current value from now on.
    pub fn track(&self) {
        self.cache.lock().track();
    }

    /// Make `value` the current value without delivering it. Starts tracking.
    pub fn seed(&self, value: V) {
        *self.cache.lock() = CurrentValue::Held(value);
    }

    /// Update the cache (if tracked) and deliver `value`.
    pub async fn emit(&self, value: V) {
        self.core
            .send_updating(value, |v| self.cache.lock().update(v))
            .await;
    }

    /// Deliver `value` without touching the cache.
    pub async fn emit_uncached(&self, value: V) {
        self.core.send(value).await;
    }
}
