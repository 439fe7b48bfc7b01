// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Delivery on a node's own task.

use async_trait::async_trait;
use cellflow_core::{
    AnySubscription, CachingCore, CurrentValue, Node, NodeCore, NodeExt, NodeTask, NodeValue,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// What a [`Dispatch`] node does with values its subscribers have not caught up with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BufferingPolicy {
    /// Keep every value.
    #[default]
    Unbounded,
    /// Keep the oldest `n` values, drop newer ones while the buffer is full.
    BufferingOldest(usize),
    /// Keep the newest `n` values, evicting the oldest buffered one.
    BufferingNewest(usize),
}

impl BufferingPolicy {
    fn channel<V>(self) -> (async_channel::Sender<V>, async_channel::Receiver<V>) {
        match self {
            Self::Unbounded => async_channel::unbounded(),
            Self::BufferingOldest(limit) | Self::BufferingNewest(limit) => {
                async_channel::bounded(limit.max(1))
            }
        }
    }

    fn push<V>(self, sender: &async_channel::Sender<V>, value: V) {
        let accepted = match self {
            Self::BufferingNewest(_) => sender.force_send(value).is_ok(),
            Self::Unbounded | Self::BufferingOldest(_) => sender.try_send(value).is_ok(),
        };
        if !accepted {
            debug!("dispatch: buffer full, value dropped");
        }
    }
}

/// Node that hands upstream values to its subscribers from a task of its own.
///
/// An upstream delivery returns as soon as the value is buffered, so slow
/// subscribers of this node never hold up the upstream node or its other
/// subscribers. The buffer follows a [`BufferingPolicy`]; a limit of zero counts as
/// one.
///
/// The node keeps a current value only if its upstream had one when it was created.
#[derive(Debug)]
pub struct Dispatch<V: NodeValue> {
    outlet: CachingCore<V>,
    buffer: async_channel::Sender<V>,
    upstream: Mutex<Option<AnySubscription>>,
    relay: Mutex<Option<NodeTask>>,
}

impl<V: NodeValue> Dispatch<V> {
    async fn new<N>(source: &Arc<N>, policy: BufferingPolicy) -> Arc<Self>
    where
        N: Node<Value = V>,
    {
        let (sender, receiver) = policy.channel();
        let node = Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Untracked),
            buffer: sender.clone(),
            upstream: Mutex::new(None),
            relay: Mutex::new(None),
        });

        let seed = Arc::downgrade(&node);
        let subscription = source
            .subscribe_with_current(
                move |value| {
                    policy.push(&sender, value);
                    async {}
                },
                move |current| {
                    if let Some(node) = seed.upgrade() {
                        node.outlet.seed(current);
                    }
                    async {}
                },
            )
            .await;
        *node.upstream.lock() = Some(subscription.erase());

        let weak = Arc::downgrade(&node);
        let relay = NodeTask::spawn(move |_cancel| async move {
            while let Ok(value) = receiver.recv().await {
                let Some(node) = weak.upgrade() else {
                    break;
                };
                node.outlet.emit(value).await;
            }
        });
        *node.relay.lock() = Some(relay);

        node
    }

    /// Number of values buffered and not yet picked up for delivery.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl<V: NodeValue> Node for Dispatch<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

#[async_trait]
pub trait DispatchExt: NodeExt {
    /// Deliver on a separate task, buffering without bound.
    async fn dispatch(&self) -> Arc<Dispatch<Self::Value>>;

    /// Deliver on a separate task with the given buffering policy.
    async fn dispatch_with(&self, policy: BufferingPolicy) -> Arc<Dispatch<Self::Value>>;
}

#[async_trait]
impl<N: Node> DispatchExt for Arc<N> {
    async fn dispatch(&self) -> Arc<Dispatch<N::Value>> {
        Dispatch::new(self, BufferingPolicy::Unbounded).await
    }

    async fn dispatch_with(&self, policy: BufferingPolicy) -> Arc<Dispatch<N::Value>> {
        Dispatch::new(self, policy).await
    }
}
