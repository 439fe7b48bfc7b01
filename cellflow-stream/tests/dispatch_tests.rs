// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt, Subscription};
use cellflow_stream::prelude::*;
use cellflow_stream::Dispatch;
use cellflow_test_utils::{settle, Recorder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Subscriber that records a value only after the gate lets it through.
fn gated(
    node: &Arc<Dispatch<i32>>,
) -> (
    async_channel::Sender<()>,
    async_channel::Receiver<i32>,
    Subscription<i32>,
) {
    let (gate_tx, gate_rx) = async_channel::unbounded::<()>();
    let (seen_tx, seen_rx) = async_channel::unbounded();
    let subscription = node.subscribe(move |value| {
        let (gate, seen) = (gate_rx.clone(), seen_tx.clone());
        async move {
            gate.recv().await.ok();
            seen.send(value).await.ok();
        }
    });
    (gate_tx, seen_rx, subscription)
}

fn drain(rx: &async_channel::Receiver<i32>) -> Vec<i32> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test]
async fn test_dispatch_does_not_hold_up_upstream() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let dispatched = relay.dispatch().await;
    let (gate, seen, _slow) = gated(&dispatched);

    // Act
    let sent = timeout(Duration::from_secs(1), async {
        for value in 1..=3 {
            relay.send(value).await;
        }
    })
    .await;
    settle().await;

    // Assert
    assert!(sent.is_ok());
    assert!(drain(&seen).is_empty());
    for _ in 0..3 {
        gate.send(()).await?;
    }
    settle().await;
    assert_eq!(drain(&seen), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_buffering_newest_keeps_latest_values() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let dispatched = relay
        .dispatch_with(BufferingPolicy::BufferingNewest(1))
        .await;
    let (gate, seen, _slow) = gated(&dispatched);

    // Act
    relay.send(1).await;
    settle().await;
    relay.send(2).await;
    relay.send(3).await;

    // Assert
    assert_eq!(dispatched.buffered(), 1);
    for _ in 0..3 {
        gate.send(()).await?;
    }
    settle().await;
    assert_eq!(drain(&seen), vec![1, 3]);
    Ok(())
}

#[tokio::test]
async fn test_buffering_oldest_drops_new_values_when_full() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let dispatched = relay
        .dispatch_with(BufferingPolicy::BufferingOldest(1))
        .await;
    let (gate, seen, _slow) = gated(&dispatched);

    // Act
    relay.send(1).await;
    settle().await;
    relay.send(2).await;
    relay.send(3).await;

    // Assert
    for _ in 0..3 {
        gate.send(()).await?;
    }
    settle().await;
    assert_eq!(drain(&seen), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_dispatch_keeps_current_value_of_subject() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(5);
    let dispatched = subject.dispatch().await;
    let recorder = Recorder::subscribe(&dispatched);
    assert_eq!(dispatched.current_value(), Some(5));

    // Act
    subject.set(6).await;
    settle().await;

    // Assert
    assert_eq!(recorder.take(), vec![6]);
    assert_eq!(dispatched.current_value(), Some(6));
    Ok(())
}

#[tokio::test]
async fn test_dispatch_of_relay_has_no_current_value() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let dispatched = relay.dispatch().await;
    let recorder = Recorder::subscribe(&dispatched);

    // Act
    relay.send(4).await;
    settle().await;

    // Assert
    assert_eq!(recorder.take(), vec![4]);
    assert_eq!(dispatched.current_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_dropped_dispatch_releases_upstream() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let dispatched = relay.dispatch().await;
    assert_eq!(relay.core().subscription_count(), 1);

    // Act
    drop(dispatched);

    // Assert
    assert_eq!(relay.core().subscription_count(), 0);
    relay.send(1).await;
    Ok(())
}
