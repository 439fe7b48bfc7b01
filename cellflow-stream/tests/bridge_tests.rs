// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::prelude::*;
use futures::StreamExt;

#[tokio::test]
async fn test_into_stream_yields_later_values() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(1);
    let mut stream = subject.into_stream();

    // Act
    subject.set(2).await;
    subject.set(3).await;

    // Assert
    assert_eq!(stream.next().await, Some(2));
    assert_eq!(stream.next().await, Some(3));
    Ok(())
}

#[tokio::test]
async fn test_tap_stream_starts_with_current_value() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new("a");

    // Act
    let stream = subject.tap_stream().await;
    subject.set("b").await;

    // Assert
    let values: Vec<_> = stream.take(2).collect().await;
    assert_eq!(values, vec!["a", "b"]);
    Ok(())
}

#[tokio::test]
async fn test_dropping_stream_unsubscribes() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let stream = relay.into_stream();
    assert_eq!(relay.core().subscription_count(), 1);

    // Act
    drop(stream);

    // Assert
    assert_eq!(relay.core().subscription_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_bind_to_subject_copies_values() -> anyhow::Result<()> {
    // Arrange
    let source = Subject::new(1);
    let target = Subject::new(0);

    // Act
    let binding = source.bind_to_subject(&target).await;
    assert_eq!(target.value(), 1);
    source.set(2).await;

    // Assert
    assert_eq!(target.value(), 2);
    drop(binding);
    source.set(3).await;
    assert_eq!(target.value(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bind_to_relay_forwards_values() -> anyhow::Result<()> {
    // Arrange
    let source = Subject::new(1);
    let target = Relay::<i32>::new();
    let mut forwarded = target.into_stream();

    // Act
    let _binding = source.bind_to_relay(&target).await;
    source.set(2).await;

    // Assert
    assert_eq!(forwarded.next().await, Some(1));
    assert_eq!(forwarded.next().await, Some(2));
    Ok(())
}
