// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::prelude::*;
use cellflow_test_utils::Recorder;

#[tokio::test]
async fn test_compact_map_skips_none() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<&'static str>::new();
    let parsed = relay.compact_map(|text: &'static str| text.parse::<i32>().ok()).await;
    let recorder = Recorder::subscribe(&parsed);

    // Act
    relay.send("1").await;
    relay.send("x").await;
    relay.send("3").await;

    // Assert
    assert_eq!(recorder.take(), vec![1, 3]);
    Ok(())
}

#[tokio::test]
async fn test_compact_map_async() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(4);
    let halves = subject
        .compact_map_async(|value| async move { (value % 2 == 0).then_some(value / 2) })
        .await;

    // Act
    subject.set(5).await;

    // Assert
    assert_eq!(halves.current_value(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_compact_drops_none_values() -> anyhow::Result<()> {
    // Arrange
    let subject = Subject::new(None::<i32>);
    let present = subject.compact().await;
    let recorder = Recorder::tap(&present).await;

    // Act
    subject.set(Some(1)).await;
    subject.set(None).await;
    subject.set(Some(2)).await;

    // Assert
    assert_eq!(recorder.take(), vec![1, 2]);
    assert_eq!(present.current_value(), Some(2));
    Ok(())
}
