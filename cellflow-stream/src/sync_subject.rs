// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Subject that synchronous code can write to.

use crate::subject::Subject;
use cellflow_core::{CellflowError, Node, NodeCore, NodeTask, NodeValue, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

type OnDrop = Box<dyn FnOnce() + Send>;

/// A [`Subject`] with a non-suspending write handle.
///
/// Values handed to a [`SyncSender`] are queued and applied in order by a relay
/// task, exactly as if each had been passed to [`set`](Self::set). The relay task is
/// cancelled when the node is dropped; values still queued at that point are lost.
///
/// # Example
///
/// ```
/// use cellflow_core::Node;
/// use cellflow_stream::SyncSubject;
///
/// # #[tokio::main]
/// # async fn main() {
/// let progress = SyncSubject::new(0);
/// let sender = progress.sender();
///
/// std::thread::spawn(move || {
///     for step in 1..=3 {
///         let _ = sender.send(step);
///     }
/// })
/// .join()
/// .unwrap();
///
/// # for _ in 0..10 { tokio::task::yield_now().await; }
/// assert_eq!(progress.current_value(), Some(3));
/// # }
/// ```
pub struct SyncSubject<V: NodeValue> {
    subject: Arc<Subject<V>>,
    sender: async_channel::Sender<V>,
    _relay: NodeTask,
    on_drop: Mutex<Option<OnDrop>>,
}

/// Cloneable, non-suspending write handle of a [`SyncSubject`].
#[derive(Debug, Clone)]
pub struct SyncSender<V> {
    sender: async_channel::Sender<V>,
}

impl<V> SyncSender<V> {
    /// Queue `value` for the subject.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::ChannelEnded)` once the subject has been dropped.
    pub fn send(&self, value: V) -> Result<()> {
        self.sender
            .try_send(value)
            .map_err(|_| CellflowError::ChannelEnded)
    }
}

impl<V: NodeValue> SyncSubject<V> {
    pub fn new(value: V) -> Arc<Self> {
        Self::build(value, None)
    }

    /// Like [`new`](Self::new), running `on_drop` once the node is dropped.
    pub fn with_on_drop<F>(value: V, on_drop: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Self::build(value, Some(Box::new(on_drop)))
    }

    fn build(value: V, on_drop: Option<OnDrop>) -> Arc<Self> {
        let subject = Subject::new(value);
        let (sender, receiver) = async_channel::unbounded();

        let target = Arc::clone(&subject);
        let relay = NodeTask::spawn(move |_cancel| async move {
            while let Ok(value) = receiver.recv().await {
                target.set(value).await;
            }
        });

        Arc::new(Self {
            subject,
            sender,
            _relay: relay,
            on_drop: Mutex::new(on_drop),
        })
    }

    /// A write handle usable from synchronous code.
    pub fn sender(&self) -> SyncSender<V> {
        SyncSender {
            sender: self.sender.clone(),
        }
    }

    pub fn value(&self) -> V {
        self.subject.value()
    }

    /// Replace the value and deliver it, bypassing the queue.
    pub async fn set(&self, value: V) {
        self.subject.set(value).await;
    }

    /// See [`Subject::mutate`].
    pub async fn mutate<R, F>(&self, body: F) -> R
    where
        F: FnOnce(&mut V) -> R + Send,
        R: Send,
    {
        self.subject.mutate(body).await
    }
}

impl<V: NodeValue + Default> SyncSubject<V> {
    pub fn empty() -> Arc<Self> {
        Self::new(V::default())
    }
}

impl<V: NodeValue> Node for SyncSubject<V> {
    type Value = V;

    fn core(&self) -> &NodeCore<V> {
        self.subject.core()
    }

    fn current_value(&self) -> Option<V> {
        self.subject.current_value()
    }
}

impl<V: NodeValue> fmt::Debug for SyncSubject<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSubject")
            .field("queued", &self.sender.len())
            .finish_non_exhaustive()
    }
}

impl<V: NodeValue> Drop for SyncSubject<V> {
    fn drop(&mut self) {
        self.sender.close();
        if let Some(on_drop) = self.on_drop.get_mut().take() {
            on_drop();
        }
    }
}
