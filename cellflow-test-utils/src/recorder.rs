// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::helpers::{assert_no_recv, recv_timeout};
use async_channel::{Receiver, Sender};
use cellflow_core::{Node, NodeExt, NodeValue, Subscription};
use std::sync::Arc;

/// Collects the emissions of a node into an unbounded channel.
///
/// Dropping the recorder drops its subscription.
pub struct Recorder<V: NodeValue> {
    receiver: Receiver<V>,
    subscription: Subscription<V>,
}

fn forward<V: NodeValue>(
    sender: Sender<V>,
) -> impl Fn(V) -> futures::future::Ready<()> + Send + Sync + 'static {
    move |value| {
        // Unbounded, never full
        let _ = sender.try_send(value);
        futures::future::ready(())
    }
}

impl<V: NodeValue> Recorder<V> {
    /// Record values emitted from now on.
    pub fn subscribe<N>(node: &Arc<N>) -> Self
    where
        N: Node<Value = V>,
    {
        let (sender, receiver) = async_channel::unbounded();
        let subscription = node.subscribe(forward(sender));
        Self {
            receiver,
            subscription,
        }
    }

    /// Record the current value (if any) and every value emitted after it.
    pub async fn tap<N>(node: &Arc<N>) -> Self
    where
        N: Node<Value = V>,
    {
        let (sender, receiver) = async_channel::unbounded();
        let subscription = node.tap(forward(sender)).await;
        Self {
            receiver,
            subscription,
        }
    }

    /// Next recorded value, waiting up to 1 second.
    pub async fn recv(&self) -> V {
        recv_timeout(&self.receiver, 1_000).await
    }

    /// Next recorded value, if one is already buffered.
    pub fn try_recv(&self) -> Option<V> {
        self.receiver.try_recv().ok()
    }

    /// Every value recorded so far and not yet received.
    pub fn take(&self) -> Vec<V> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub async fn assert_no_recv(&self, timeout_ms: u64) {
        assert_no_recv(&self.receiver, timeout_ms).await;
    }

    pub fn receiver(&self) -> &Receiver<V> {
        &self.receiver
    }

    /// Stop recording. Values already buffered stay available.
    pub fn unsubscribe(self) -> Receiver<V> {
        drop(self.subscription);
        self.receiver
    }
}
