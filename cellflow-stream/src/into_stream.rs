// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridging from nodes to `futures::Stream`.

use async_trait::async_trait;
use cellflow_core::{Node, NodeExt, NodeValue, Subscription};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Stream of the values emitted by a node.
///
/// Values are buffered without bound, so a slow consumer never holds up the node.
/// The stream owns its subscription: dropping it unsubscribes. `NodeStream` is
/// `Unpin`, so `StreamExt::next` works without pinning it first.
pub struct NodeStream<V: NodeValue> {
    receiver: Pin<Box<async_channel::Receiver<V>>>,
    _subscription: Subscription<V>,
}

impl<V: NodeValue> NodeStream<V> {
    fn new(receiver: async_channel::Receiver<V>, subscription: Subscription<V>) -> Self {
        Self {
            receiver: Box::pin(receiver),
            _subscription: subscription,
        }
    }
}

impl<V: NodeValue> Stream for NodeStream<V> {
    type Item = V;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        self.receiver.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.receiver.len(), None)
    }
}

#[async_trait]
pub trait IntoStreamExt: NodeExt {
    /// Stream of the values emitted from now on.
    fn into_stream(&self) -> NodeStream<Self::Value>;

    /// Stream starting with the current value, if any.
    async fn tap_stream(&self) -> NodeStream<Self::Value>;
}

#[async_trait]
impl<N: Node> IntoStreamExt for Arc<N> {
    fn into_stream(&self) -> NodeStream<N::Value> {
        let (sender, receiver) = async_channel::unbounded();
        let subscription = self.subscribe(move |value| {
            let sender = sender.clone();
            async move {
                let _ = sender.send(value).await;
            }
        });
        NodeStream::new(receiver, subscription)
    }

    async fn tap_stream(&self) -> NodeStream<N::Value> {
        let (sender, receiver) = async_channel::unbounded();
        let subscription = self
            .tap(move |value| {
                let sender = sender.clone();
                async move {
                    let _ = sender.send(value).await;
                }
            })
            .await;
        NodeStream::new(receiver, subscription)
    }
}
