// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::prelude::*;
use cellflow_test_utils::Recorder;

#[tokio::test]
async fn test_first_emits_current_value_only() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(1);
    let first = subject.first().await;
    let recorder = Recorder::tap(&first).await;

    // Act
    subject.set(2).await;

    // Assert
    assert_eq!(recorder.take(), vec![1]);
    assert_eq!(first.current_value(), Some(1));
    assert_eq!(subject.core().subscription_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_first_of_relay_waits_for_first_send() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let first = relay.first().await;
    let recorder = Recorder::subscribe(&first);

    // Act
    relay.send(7).await;
    relay.send(8).await;

    // Assert
    assert_eq!(recorder.take(), vec![7]);
    assert_eq!(first.current_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_drop_while_forwards_everything_after_first_mismatch() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let started = relay.drop_while(|value| *value < 3).await;
    let recorder = Recorder::subscribe(&started);

    // Act
    for value in [1, 2, 3, 1, 4] {
        relay.send(value).await;
    }

    // Assert
    assert_eq!(recorder.take(), vec![3, 1, 4]);
    Ok(())
}

#[tokio::test]
async fn test_remove_duplicates_suppresses_consecutive_equal_values() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(1);
    let distinct = subject.remove_duplicates().await;
    let recorder = Recorder::tap(&distinct).await;

    // Act
    for value in [1, 2, 2, 1, 1] {
        subject.set(value).await;
    }

    // Assert
    assert_eq!(recorder.take(), vec![1, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_remove_duplicates_by_custom_comparison() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<String>::new();
    let distinct = relay
        .remove_duplicates_by(|a, b| a.eq_ignore_ascii_case(b))
        .await;
    let recorder = Recorder::subscribe(&distinct);

    // Act
    for word in ["a", "A", "b", "B", "a"] {
        relay.send(word.to_string()).await;
    }

    // Assert
    assert_eq!(recorder.take(), vec!["a", "b", "a"]);
    Ok(())
}

#[tokio::test]
async fn test_with_initial_value_reports_initial_until_upstream_emits() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let node = relay.with_initial_value(0);
    let recorder = Recorder::tap(&node).await;

    // Act
    relay.send(5).await;

    // Assert
    assert_eq!(recorder.take(), vec![0, 5]);
    assert_eq!(node.current_value(), Some(5));
    Ok(())
}

#[tokio::test]
async fn test_with_initial_value_ignores_upstream_current_value() -> anyhow::Result<()> {
    let subject = Subject::new(9);

    let node = subject.with_initial_value(0);

    assert_eq!(node.current_value(), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_inspect_passes_values_through() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(1);
    let inspected = subject.inspect("counter").await;
    let recorder = Recorder::tap(&inspected).await;

    // Act
    subject.set(2).await;

    // Assert
    assert_eq!(inspected.label(), "counter");
    assert_eq!(recorder.take(), vec![1, 2]);
    Ok(())
}
