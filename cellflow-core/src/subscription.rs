// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::node::{Node, NodeValue};
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub(crate) type Callback<V> = Box<dyn Fn(V) -> BoxFuture<'static, ()> + Send + Sync>;

/// The registered half of a subscription.
///
/// Nodes only hold `Weak` references to entries, the [`Subscription`] handle owns it.
/// The entry in turn owns its node, so a live subscription keeps the upstream graph
/// alive while nothing points back downstream.
pub struct SubscriptionEntry<V: NodeValue> {
    callback: Callback<V>,
    _node: Arc<dyn Node<Value = V>>,
}

impl<V: NodeValue> SubscriptionEntry<V> {
    pub(crate) fn invoke(&self, value: V) -> BoxFuture<'static, ()> {
        (self.callback)(value)
    }
}

/// Handle for a registered callback.
///
/// Dropping it cancels the subscription: the node skips and prunes the entry on its
/// next delivery. The handle also keeps the subscribed node alive.
#[must_use = "a subscription is cancelled as soon as it is dropped"]
pub struct Subscription<V: NodeValue> {
    entry: Arc<SubscriptionEntry<V>>,
}

impl<V: NodeValue> Subscription<V> {
    pub(crate) fn new(callback: Callback<V>, node: Arc<dyn Node<Value = V>>) -> Self {
        Self {
            entry: Arc::new(SubscriptionEntry {
                callback,
                _node: node,
            }),
        }
    }

    pub(crate) fn entry(&self) -> &Arc<SubscriptionEntry<V>> {
        &self.entry
    }

    pub(crate) fn invoke(&self, value: V) -> BoxFuture<'static, ()> {
        self.entry.invoke(value)
    }

    /// Explicitly cancel the subscription.
    pub fn cancel(self) {}

    /// Forget the value type, for storing subscriptions of different types together.
    pub fn erase(self) -> AnySubscription {
        self.into()
    }
}

impl<V: NodeValue> fmt::Debug for Subscription<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("value_type", &std::any::type_name::<V>())
            .finish_non_exhaustive()
    }
}

/// Type-erased [`Subscription`].
#[must_use = "a subscription is cancelled as soon as it is dropped"]
pub struct AnySubscription {
    _entry: Arc<dyn Any + Send + Sync>,
}

impl<V: NodeValue> From<Subscription<V>> for AnySubscription {
    fn from(subscription: Subscription<V>) -> Self {
        Self {
            _entry: subscription.entry,
        }
    }
}

impl fmt::Debug for AnySubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySubscription").finish_non_exhaustive()
    }
}
