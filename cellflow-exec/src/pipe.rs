// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Capacity-1 rendezvous channel between push-style nodes and pull-style consumers.

use cellflow_core::{
    AnySubscription, AsyncLock, CancellationToken, CellflowError, Node, NodeExt, NodeTask, Result,
};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// One transfer through an [`AsyncPipe`].
///
/// The end of a sequence travels through the same slot as the values, so it is
/// observed only after every value pushed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeItem<V> {
    Value(V),
    End,
}

impl<V> PipeItem<V> {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Value(value) => Some(value),
            Self::End => None,
        }
    }
}

struct Slot<V> {
    item: Option<PipeItem<V>>,
    // Producer gave up after the consumer was granted the item
    abandoned: bool,
}

struct Channel<V> {
    slot: Mutex<Slot<V>>,
    producers: AsyncLock,
    filled: AsyncLock,
    drained: AsyncLock,
    closed: CancellationToken,
}

async fn acquire(lock: &AsyncLock, token: Option<&CancellationToken>) -> Result<()> {
    match token {
        Some(token) => lock.acquire_cancellable(token).await,
        None => {
            lock.acquire().await;
            Ok(())
        }
    }
}

impl<V: Send> Channel<V> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                item: None,
                abandoned: false,
            }),
            producers: AsyncLock::new(),
            filled: AsyncLock::new_held(),
            drained: AsyncLock::new_held(),
            closed: CancellationToken::new(),
        }
    }

    async fn push(&self, item: PipeItem<V>, token: Option<&CancellationToken>) -> Result<()> {
        acquire(&self.producers, token).await?;
        let mut handoff = Handoff {
            channel: self,
            completed: false,
        };

        {
            let mut slot = self.slot.lock();
            debug_assert!(slot.item.is_none());
            slot.item = Some(item);
            self.filled.release();
        }

        acquire(&self.drained, token).await?;
        handoff.completed = true;
        Ok(())
    }

    async fn pull(&self, token: Option<&CancellationToken>) -> Result<PipeItem<V>> {
        loop {
            acquire(&self.filled, token).await?;
            if let Some(item) = self.take_filled() {
                return Ok(item);
            }
        }
    }

    // `filled` is only signalled with an item in the slot
    fn take_filled(&self) -> Option<PipeItem<V>> {
        let mut slot = self.slot.lock();
        let item = slot.item.take()?;
        if std::mem::take(&mut slot.abandoned) {
            debug!("pipe: producer stopped waiting before its value was pulled");
            self.producers.release();
        } else {
            self.drained.release();
        }
        Some(item)
    }
}

/// Ends a push: releases the producer lock and undoes a push whose producer
/// stopped waiting for the consumer.
struct Handoff<'a, V: Send> {
    channel: &'a Channel<V>,
    completed: bool,
}

impl<V: Send> Drop for Handoff<'_, V> {
    fn drop(&mut self) {
        let channel = self.channel;
        let mut slot = channel.slot.lock();
        if !self.completed {
            if slot.item.is_some() {
                if channel.filled.try_acquire() {
                    slot.item = None;
                    warn!("pipe: push cancelled, unconsumed value retracted");
                } else {
                    // The consumer was granted the item and releases the producer lock
                    slot.abandoned = true;
                    return;
                }
            } else {
                // Consumed after all: absorb the signal nobody waits for any more
                let _ = channel.drained.try_acquire();
            }
        }
        drop(slot);
        channel.producers.release();
    }
}

/// Backpressured single-slot channel.
///
/// `push` returns only once the pushed item has been pulled, so at most one item is
/// ever in flight. Concurrent producers are served one at a time. The end of the
/// sequence is sent in-band as [`PipeItem::End`].
///
/// Share the pipe through an `Arc` to push and pull from different tasks.
///
/// # Example
///
/// ```
/// use cellflow_exec::{AsyncPipe, PipeItem};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let pipe = Arc::new(AsyncPipe::new());
///
/// let producer = {
///     let pipe = Arc::clone(&pipe);
///     tokio::spawn(async move {
///         pipe.push_value(1).await;
///         pipe.end().await;
///     })
/// };
///
/// assert_eq!(pipe.pull().await, PipeItem::Value(1));
/// assert!(pipe.pull_value().await.is_err());
/// producer.await.unwrap();
/// # }
/// ```
pub struct AsyncPipe<V: Send + 'static> {
    channel: Arc<Channel<V>>,
    _upstream: Option<AnySubscription>,
    _feeder: Option<NodeTask>,
}

impl<V: Send + 'static> AsyncPipe<V> {
    pub fn new() -> Self {
        Self {
            channel: Arc::new(Channel::new()),
            _upstream: None,
            _feeder: None,
        }
    }

    /// Pipe fed by `stream`: every item is pushed in order, followed by `End`.
    ///
    /// The feeding task stops when the pipe is dropped.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = V> + Send + 'static,
    {
        let channel = Arc::new(Channel::new());
        let feed = Arc::clone(&channel);
        let feeder = NodeTask::spawn(move |_cancel| async move {
            futures::pin_mut!(stream);
            let closed = feed.closed.clone();
            while let Some(value) = stream.next().await {
                if feed.push(PipeItem::Value(value), Some(&closed)).await.is_err() {
                    return;
                }
            }
            let _ = feed.push(PipeItem::End, Some(&closed)).await;
        });

        Self {
            channel,
            _upstream: None,
            _feeder: Some(feeder),
        }
    }

    /// Hand `item` to the consumer and wait until it was pulled.
    ///
    /// Dropping the returned future before the item was pulled retracts it.
    pub async fn push(&self, item: PipeItem<V>) {
        // Without a token the transfer cannot fail
        let _ = self.channel.push(item, None).await;
    }

    pub async fn push_value(&self, value: V) {
        self.push(PipeItem::Value(value)).await;
    }

    /// Send the end-of-sequence marker.
    pub async fn end(&self) {
        self.push(PipeItem::End).await;
    }

    /// Cancellable form of [`push`](Self::push).
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` if `token` is cancelled while waiting
    /// for another producer or for the consumer. An item that was not pulled yet is
    /// retracted.
    pub async fn push_cancellable(&self, item: PipeItem<V>, token: &CancellationToken) -> Result<()> {
        self.channel.push(item, Some(token)).await
    }

    /// Wait for the next item.
    pub async fn pull(&self) -> PipeItem<V> {
        loop {
            self.channel.filled.acquire().await;
            if let Some(item) = self.channel.take_filled() {
                return item;
            }
        }
    }

    /// Cancellable form of [`pull`](Self::pull).
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` if `token` is cancelled before an
    /// item arrives. No item is lost.
    pub async fn pull_cancellable(&self, token: &CancellationToken) -> Result<PipeItem<V>> {
        self.channel.pull(Some(token)).await
    }

    /// Wait for the next value.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::ChannelEnded)` when the end marker is pulled.
    pub async fn pull_value(&self) -> Result<V> {
        self.pull().await.into_value().ok_or(CellflowError::ChannelEnded)
    }

    /// Pulled values as a stream that finishes at the end marker.
    pub fn into_stream(self) -> impl Stream<Item = V> + Send {
        futures::stream::unfold(self, |pipe| async move {
            match pipe.pull().await {
                PipeItem::Value(value) => Some((value, pipe)),
                PipeItem::End => None,
            }
        })
    }
}

impl<V: Send + 'static> Default for AsyncPipe<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Send + 'static> Drop for AsyncPipe<V> {
    fn drop(&mut self) {
        self.channel.closed.cancel();
    }
}

impl<V: Send + 'static> fmt::Debug for AsyncPipe<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPipe")
            .field("filled", &(self.channel.filled.value() > 0))
            .field("producers_waiting", &self.channel.producers.waiting())
            .finish_non_exhaustive()
    }
}

/// Extension trait feeding a node into an [`AsyncPipe`].
pub trait PipeExt: NodeExt {
    /// Push every value emitted from now on into a new pipe.
    ///
    /// Each delivery of the node waits until the consumer pulled the value, which
    /// slows the node down to the pace of the consumer. The pipe keeps the
    /// subscription; dropping the pipe releases a delivery still waiting on it.
    fn pipe(&self) -> AsyncPipe<Self::Value>;
}

impl<N: Node> PipeExt for Arc<N> {
    fn pipe(&self) -> AsyncPipe<N::Value> {
        let channel = Arc::new(Channel::new());
        let feed = Arc::clone(&channel);
        let subscription = self.subscribe(move |value| {
            let feed = Arc::clone(&feed);
            async move {
                let closed = feed.closed.clone();
                if feed.push(PipeItem::Value(value), Some(&closed)).await.is_err() {
                    debug!("pipe: dropped before the value was pulled");
                }
            }
        });

        AsyncPipe {
            channel,
            _upstream: Some(subscription.erase()),
            _feeder: None,
        }
    }
}
