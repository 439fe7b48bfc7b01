// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The node protocol.
//!
//! A node is a time-varying value. It may report a *current value* and it pushes every
//! new value to its subscribers, one value at a time and in registration order. Each
//! node serializes delivery with its own [`AsyncLock`]: a second `send` waits until
//! every subscriber has finished with the first one, even when both sends are polled
//! by the same task. A subscriber that sends into the node delivering to it would wait
//! forever; debug builds panic instead.
//!
//! Node implementations embed a [`NodeCore`] and implement [`Node`]. Everything a
//! caller does with a node goes through [`NodeExt`], implemented for `Arc<N>`.

use crate::async_lock::{AsyncLock, AsyncLockGuard};
use crate::subscription::{Callback, Subscription, SubscriptionEntry};
use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

/// Bounds shared by every value that flows through a node.
pub trait NodeValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> NodeValue for T {}

/// A reactive node.
///
/// Implementors provide access to their [`NodeCore`] and a point-in-time snapshot
/// of their current value. `current_value` never suspends.
pub trait Node: Send + Sync + 'static {
    type Value: NodeValue;

    fn core(&self) -> &NodeCore<Self::Value>;

    fn current_value(&self) -> Option<Self::Value>;
}

/// Subscriber list and delivery lock shared by every node implementation.
pub struct NodeCore<V: NodeValue> {
    subscriptions: Mutex<Vec<Weak<SubscriptionEntry<V>>>>,
    delivery: AsyncLock,
}

impl<V: NodeValue> NodeCore<V> {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            delivery: AsyncLock::new().with_deadlock_detection(),
        }
    }

    /// Acquire the delivery lock.
    ///
    /// Operators hold it while updating cached state that must change together with
    /// a delivery, see [`deliver`](Self::deliver).
    pub async fn lock(&self) -> AsyncLockGuard<'_> {
        self.delivery.lock().await
    }

    /// Deliver `value` to every live subscriber under the delivery lock.
    pub async fn send(&self, value: V) {
        let guard = self.delivery.lock().await;
        self.deliver(&guard, value).await;
    }

    /// Run `update` and deliver `value` within one lock acquisition.
    ///
    /// Readers of the cache written by `update` never see a value that has not been
    /// (or is not being) delivered.
    pub async fn send_updating<F>(&self, value: V, update: F)
    where
        F: FnOnce(&V) + Send,
    {
        let guard = self.delivery.lock().await;
        update(&value);
        self.deliver(&guard, value).await;
    }

    /// Deliver `value` while the caller holds the delivery lock.
    ///
    /// Subscribers run one after another in registration order. Entries whose
    /// [`Subscription`] was dropped are skipped and removed.
    pub async fn deliver(&self, guard: &AsyncLockGuard<'_>, value: V) {
        debug_assert!(guard.guards(&self.delivery));

        guard
            .scope(async {
                let mut index = 0;
                while let Some(entry) = self.next_live(&mut index) {
                    entry.invoke(value.clone()).await;
                }
            })
            .await;
    }

    fn next_live(&self, index: &mut usize) -> Option<Arc<SubscriptionEntry<V>>> {
        let mut subscriptions = self.subscriptions.lock();
        while *index < subscriptions.len() {
            if let Some(entry) = subscriptions[*index].upgrade() {
                *index += 1;
                return Some(entry);
            }
            subscriptions.remove(*index);
        }
        None
    }

    pub(crate) fn register(&self, entry: &Arc<SubscriptionEntry<V>>) {
        self.subscriptions.lock().push(Arc::downgrade(entry));
    }

    /// Number of subscriptions that are still alive.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}

impl<V: NodeValue> Default for NodeCore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: NodeValue> fmt::Debug for NodeCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("subscriptions", &self.subscriptions.lock().len())
            .field("delivery", &self.delivery)
            .finish()
    }
}

/// Subscribing to and sending through a node.
///
/// # Example
///
/// ```
/// use cellflow_core::{Node, NodeCore, NodeExt};
/// use std::sync::Arc;
///
/// struct Ping(NodeCore<u32>);
///
/// impl Node for Ping {
///     type Value = u32;
///     fn core(&self) -> &NodeCore<u32> {
///         &self.0
///     }
///     fn current_value(&self) -> Option<u32> {
///         None
///     }
/// }
///
/// # async fn example() {
/// let node = Arc::new(Ping(NodeCore::new()));
/// let _subscription = node.subscribe(|value| async move {
///     println!("got {value}");
/// });
/// node.send(1).await;
/// # }
/// ```
#[async_trait]
pub trait NodeExt: Send + Sync {
    type Value: NodeValue;

    /// Register `on_value` without emitting anything to it.
    fn subscribe<F, Fut>(&self, on_value: F) -> Subscription<Self::Value>
    where
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static;

    /// Register `on_value` and hand it the current value, if any.
    ///
    /// Both steps happen under the delivery lock, so the callback sees the current
    /// value before any value sent after this call.
    async fn tap<F, Fut>(&self, on_value: F) -> Subscription<Self::Value>
    where
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static;

    /// Like [`tap`](Self::tap), but the current value goes to `on_current`.
    async fn subscribe_with_current<F, Fut, C, CFut>(
        &self,
        on_value: F,
        on_current: C,
    ) -> Subscription<Self::Value>
    where
        F: Fn(Self::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        C: FnOnce(Self::Value) -> CFut + Send + 'static,
        CFut: Future<Output = ()> + Send + 'static;

    /// Deliver `value` to every subscriber.
    async fn send(&self, value: Self::Value);
}

#[async_trait]
impl<N: Node> NodeExt for Arc<N> {
    type Value = N::Value;

    fn subscribe<F, Fut>(&self, on_value: F) -> Subscription<N::Value>
    where
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback<N::Value> = Box::new(move |value| on_value(value).boxed());
        let node: Arc<N> = Arc::clone(self);
        let node: Arc<dyn Node<Value = N::Value>> = node;
        let subscription = Subscription::new(callback, node);
        self.core().register(subscription.entry());
        subscription
    }

    async fn tap<F, Fut>(&self, on_value: F) -> Subscription<N::Value>
    where
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let guard = self.core().lock().await;
        let subscription = self.subscribe(on_value);
        if let Some(current) = self.current_value() {
            guard.scope(subscription.invoke(current)).await;
        }
        drop(guard);
        subscription
    }

    async fn subscribe_with_current<F, Fut, C, CFut>(
        &self,
        on_value: F,
        on_current: C,
    ) -> Subscription<N::Value>
    where
        F: Fn(N::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
        C: FnOnce(N::Value) -> CFut + Send + 'static,
        CFut: Future<Output = ()> + Send + 'static,
    {
        let guard = self.core().lock().await;
        let subscription = self.subscribe(on_value);
        if let Some(current) = self.current_value() {
            guard.scope(on_current(current)).await;
        }
        drop(guard);
        subscription
    }

    async fn send(&self, value: N::Value) {
        self.core().send(value).await;
    }
}

/// Tap `source` on behalf of `target` without keeping `target` alive.
///
/// The returned subscription is meant to be stored inside `target`. Values arriving
/// after `target` was dropped are ignored.
pub async fn tap_weak<N, T, F, Fut>(
    source: &Arc<N>,
    target: &Arc<T>,
    on_value: F,
) -> Subscription<N::Value>
where
    N: Node,
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, N::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let target: Weak<T> = Arc::downgrade(target);
    source
        .tap(move |value| {
            let pending = target.upgrade().map(|target| on_value(target, value));
            async move {
                if let Some(pending) = pending {
                    pending.await;
                }
            }
        })
        .await
}

/// Non-emitting counterpart of [`tap_weak`].
pub fn subscribe_weak<N, T, F, Fut>(
    source: &Arc<N>,
    target: &Arc<T>,
    on_value: F,
) -> Subscription<N::Value>
where
    N: Node,
    T: Send + Sync + 'static,
    F: Fn(Arc<T>, N::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let target: Weak<T> = Arc::downgrade(target);
    source.subscribe(move |value| {
        let pending = target.upgrade().map(|target| on_value(target, value));
        async move {
            if let Some(pending) = pending {
                pending.await;
            }
        }
    })
}
