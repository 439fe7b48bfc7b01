// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::prelude::*;
use cellflow_test_utils::Recorder;

#[tokio::test]
async fn test_scan_accumulates_from_seed() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(1);
    let sum = subject.scan(10, |total, value| total + value).await;
    let recorder = Recorder::tap(&sum).await;

    // Act
    subject.set(2).await;
    subject.set(3).await;

    // Assert
    assert_eq!(recorder.take(), vec![11, 13, 16]);
    Ok(())
}

#[tokio::test]
async fn test_scan_on_relay_starts_without_current_value() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<char>::new();
    let history = relay
        .scan(Vec::new(), |seen: &Vec<char>, value| {
            let mut seen = seen.clone();
            seen.push(value);
            seen
        })
        .await;

    // Act
    relay.send('a').await;
    relay.send('b').await;

    // Assert
    assert_eq!(history.current_value(), None);
    let recorder = Recorder::subscribe(&history);
    relay.send('c').await;
    assert_eq!(recorder.take(), vec![vec!['a', 'b', 'c']]);
    Ok(())
}

#[tokio::test]
async fn test_self_scan_sees_previous_value() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(5);
    let deltas = subject
        .self_scan(|previous, current| previous.map_or(0, |previous| current - previous))
        .await;
    let recorder = Recorder::tap(&deltas).await;

    // Act
    subject.set(8).await;
    subject.set(6).await;

    // Assert
    assert_eq!(recorder.take(), vec![0, 3, -2]);
    Ok(())
}

#[tokio::test]
async fn test_with_previous_pairs_values() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new("a");
    let pairs = subject.with_previous().await;

    // Act
    subject.set("b").await;

    // Assert
    assert_eq!(pairs.current_value(), Some((Some("a"), "b")));
    Ok(())
}
