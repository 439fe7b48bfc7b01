// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::relay::Relay;
use crate::subject::Subject;
use crate::sync_subject::SyncSubject;
use async_trait::async_trait;
use cellflow_core::{Node, NodeExt, Subscription};
use std::sync::Arc;

/// Feed the values of a node into a leaf node.
///
/// The returned subscription keeps the binding alive. It holds the source node and a
/// strong reference to the target.
#[async_trait]
pub trait BindExt: NodeExt {
    /// Write the current value and every later value into `subject`.
    async fn bind_to_subject(&self, subject: &Arc<Subject<Self::Value>>)
        -> Subscription<Self::Value>;

    /// Send the current value and every later value through `relay`.
    async fn bind_to_relay(&self, relay: &Arc<Relay<Self::Value>>) -> Subscription<Self::Value>;

    async fn bind_to_sync_subject(
        &self,
        subject: &Arc<SyncSubject<Self::Value>>,
    ) -> Subscription<Self::Value>;
}

#[async_trait]
impl<N: Node> BindExt for Arc<N> {
    async fn bind_to_subject(&self, subject: &Arc<Subject<N::Value>>) -> Subscription<N::Value> {
        let subject = Arc::clone(subject);
        self.tap(move |value| {
            let subject = Arc::clone(&subject);
            async move { subject.set(value).await }
        })
        .await
    }

    async fn bind_to_relay(&self, relay: &Arc<Relay<N::Value>>) -> Subscription<N::Value> {
        let relay = Arc::clone(relay);
        self.tap(move |value| {
            let relay = Arc::clone(&relay);
            async move { relay.send(value).await }
        })
        .await
    }

    async fn bind_to_sync_subject(
        &self,
        subject: &Arc<SyncSubject<N::Value>>,
    ) -> Subscription<N::Value> {
        let subject = Arc::clone(subject);
        self.tap(move |value| {
            let subject = Arc::clone(&subject);
            async move { subject.set(value).await }
        })
        .await
    }
}
