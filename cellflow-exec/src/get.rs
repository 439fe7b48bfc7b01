// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::task::with_timeout;
use async_trait::async_trait;
use cellflow_core::{CancellationToken, Node, NodeExt, Result};
use event_listener::Event;
use parking_lot::Mutex;
use std::future::ready;
use std::sync::Arc;
use std::time::Duration;

/// First accepted value, handed from a subscriber callback to the waiting caller.
struct Found<T> {
    value: Mutex<Option<T>>,
    ready: Event,
}

impl<T> Found<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            ready: Event::new(),
        }
    }

    fn offer(&self, value: T) {
        let mut slot = self.value.lock();
        if slot.is_none() {
            *slot = Some(value);
            self.ready.notify(usize::MAX);
        }
    }

    fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    async fn wait(&self) -> T {
        loop {
            if let Some(value) = self.take() {
                return value;
            }
            let listener = self.ready.listen();
            // Re-check after registering: offer() may have run in between
            if let Some(value) = self.take() {
                return value;
            }
            listener.await;
        }
    }
}

async fn first_match<N, T, F>(node: &Arc<N>, include_current: bool, transform: F) -> T
where
    N: Node,
    T: Send + 'static,
    F: Fn(N::Value) -> Option<T> + Send + Sync + 'static,
{
    let found = Arc::new(Found::new());
    let offer = Arc::clone(&found);
    let on_value = move |value| {
        if let Some(accepted) = transform(value) {
            offer.offer(accepted);
        }
        ready(())
    };

    let _subscription = if include_current {
        node.tap(on_value).await
    } else {
        node.subscribe(on_value)
    };
    found.wait().await
}

/// Waiting for a single value of a node.
///
/// Every wait subscribes for its own duration only. The `transform` variants skip
/// values for which the transform returns `None`.
#[async_trait]
pub trait GetExt: NodeExt {
    /// The current value, or the next emitted one if there is none.
    async fn get(&self) -> Self::Value;

    /// The next emitted value, ignoring the current one.
    async fn get_next(&self) -> Self::Value;

    /// The first value (current value included) accepted by `transform`.
    async fn get_where<T, F>(&self, transform: F) -> T
    where
        T: Send + 'static,
        F: Fn(Self::Value) -> Option<T> + Send + Sync + 'static;

    /// Like [`get_where`](Self::get_where), but gives up when `token` is cancelled.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` if `token` is cancelled first.
    async fn get_cancellable<T, F>(&self, token: &CancellationToken, transform: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(Self::Value) -> Option<T> + Send + Sync + 'static;

    /// Like [`get_where`](Self::get_where), but gives up after `timeout`.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Timeout)` if no value was accepted in time.
    async fn get_timeout<T, F>(&self, timeout: Duration, transform: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(Self::Value) -> Option<T> + Send + Sync + 'static;

    /// Wait until a value (current value included) satisfies `predicate`.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` if `token` is cancelled first.
    async fn wait_for<P>(&self, predicate: P, token: &CancellationToken) -> Result<()>
    where
        P: Fn(&Self::Value) -> bool + Send + Sync + 'static;
}

#[async_trait]
impl<N: Node> GetExt for Arc<N> {
    async fn get(&self) -> N::Value {
        first_match(self, true, Some).await
    }

    async fn get_next(&self) -> N::Value {
        first_match(self, false, Some).await
    }

    async fn get_where<T, F>(&self, transform: F) -> T
    where
        T: Send + 'static,
        F: Fn(N::Value) -> Option<T> + Send + Sync + 'static,
    {
        first_match(self, true, transform).await
    }

    async fn get_cancellable<T, F>(&self, token: &CancellationToken, transform: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(N::Value) -> Option<T> + Send + Sync + 'static,
    {
        token
            .run_until_cancelled(first_match(self, true, transform))
            .await
    }

    async fn get_timeout<T, F>(&self, timeout: Duration, transform: F) -> Result<T>
    where
        T: Send + 'static,
        F: Fn(N::Value) -> Option<T> + Send + Sync + 'static,
    {
        with_timeout(timeout, first_match(self, true, transform)).await
    }

    async fn wait_for<P>(&self, predicate: P, token: &CancellationToken) -> Result<()>
    where
        P: Fn(&N::Value) -> bool + Send + Sync + 'static,
    {
        self.get_cancellable(token, move |value| predicate(&value).then_some(()))
            .await
    }
}
