// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Nodes fed from a `futures::Stream`.

use cellflow_core::{CachingCore, CurrentValue, Node, NodeCore, NodeTask, NodeValue};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// Leaf node that relays every item of a stream and caches the latest one.
///
/// The relay runs on a [`NodeTask`] that is cancelled when the node is dropped.
/// The node has no current value until the first item arrives.
///
/// # Example
///
/// ```
/// use cellflow_core::Node;
/// use cellflow_stream::StreamSource;
///
/// # #[tokio::main]
/// # async fn main() {
/// let (tx, rx) = async_channel::unbounded();
/// let source = StreamSource::new(rx);
///
/// tx.send(5).await.unwrap();
/// # for _ in 0..10 { tokio::task::yield_now().await; }
/// assert_eq!(source.current_value(), Some(5));
/// # }
/// ```
#[derive(Debug)]
pub struct StreamSource<V: NodeValue> {
    outlet: CachingCore<V>,
    relay: Mutex<Option<NodeTask>>,
}

impl<V: NodeValue> StreamSource<V> {
    pub fn new<S>(stream: S) -> Arc<Self>
    where
        S: Stream<Item = V> + Send + 'static,
    {
        let node = Arc::new(Self {
            outlet: CachingCore::new(CurrentValue::Pending),
            relay: Mutex::new(None),
        });

        let weak = Arc::downgrade(&node);
        let relay = NodeTask::spawn(move |_cancel| async move {
            let mut stream = Box::pin(stream);
            while let Some(item) = stream.next().await {
                let Some(node) = weak.upgrade() else {
                    break;
                };
                node.outlet.emit(item).await;
            }
        });
        *node.relay.lock() = Some(relay);

        node
    }

    /// Whether the source stream has ended.
    pub fn is_finished(&self) -> bool {
        self.relay
            .lock()
            .as_ref()
            .is_some_and(NodeTask::is_finished)
    }
}

impl<V: NodeValue> Node for StreamSource<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.outlet.core()
    }

    fn current_value(&self) -> Option<V> {
        self.outlet.current_value()
    }
}

/// Turn any `futures::Stream` into a [`StreamSource`] node.
pub trait IntoNodeExt: Stream + Sized + Send + 'static
where
    Self::Item: NodeValue,
{
    fn into_node(self) -> Arc<StreamSource<Self::Item>> {
        StreamSource::new(self)
    }
}

impl<S> IntoNodeExt for S
where
    S: Stream + Send + 'static,
    S::Item: NodeValue,
{
}
