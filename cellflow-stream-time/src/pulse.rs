// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::throttle::{Throttle, ThrottleExt};
use async_trait::async_trait;
use cellflow_core::{Node, NodeExt};
use cellflow_stream::{MapExt, Subject, SwitchToLatest, SwitchToLatestExt};
use std::sync::Arc;
use std::time::Duration;

/// Extension trait turning every value into a pulse.
#[async_trait]
pub trait PulseExt: NodeExt {
    /// Emit `Some(value)` for every upstream value, then `None` after `length`.
    ///
    /// A value arriving while a pulse is on restarts the pulse with the new value.
    /// The node has a current value from the first upstream value on.
    ///
    /// # Example
    ///
    /// ```
    /// use cellflow_core::Node;
    /// use cellflow_stream::Relay;
    /// use cellflow_stream_time::PulseExt;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let clicks = Relay::<u32>::new();
    /// let highlight = clicks.pulse(Duration::from_millis(300)).await;
    /// assert_eq!(highlight.current_value(), None);
    /// # }
    /// ```
    async fn pulse(&self, length: Duration) -> Arc<SwitchToLatest<Throttle<Option<Self::Value>>>>;
}

#[async_trait]
impl<N: Node> PulseExt for Arc<N> {
    async fn pulse(&self, length: Duration) -> Arc<SwitchToLatest<Throttle<Option<N::Value>>>> {
        self.map_async(move |value| async move {
            let source = Subject::new(Some(value));
            let emitter = source.throttle(length).await;
            source.set(None).await;
            emitter
        })
        .await
        .switch_to_latest()
        .await
    }
}
