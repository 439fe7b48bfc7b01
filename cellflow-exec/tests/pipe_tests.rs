// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{CancellationToken, CellflowError, Node, NodeExt};
use cellflow_exec::{AsyncPipe, PipeExt, PipeItem};
use cellflow_stream::Relay;
use cellflow_test_utils::settle;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_push_returns_only_after_pull() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::new());
    let producer = {
        let pipe = Arc::clone(&pipe);
        tokio::spawn(async move { pipe.push_value(1).await })
    };

    // Act
    settle().await;
    let waiting = !producer.is_finished();
    let item = pipe.pull().await;
    producer.await?;

    // Assert
    assert!(waiting, "push returned before the value was pulled");
    assert_eq!(item, PipeItem::Value(1));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_producers_are_serialized() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::new());
    let producers: Vec<_> = (0..10)
        .map(|n| {
            let pipe = Arc::clone(&pipe);
            tokio::spawn(async move { pipe.push_value(n).await })
        })
        .collect();

    // Act
    let mut received = Vec::new();
    for _ in 0..10 {
        received.push(pipe.pull_value().await?);
    }
    for producer in producers {
        producer.await?;
    }

    // Assert
    received.sort_unstable();
    assert_eq!(received, (0..10).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_on_multiple_threads_lose_nothing() -> anyhow::Result<()> {
    // Arrange
    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 50;
    let pipe = Arc::new(AsyncPipe::new());
    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let pipe = Arc::clone(&pipe);
            tokio::spawn(async move {
                for i in 0..PER_PRODUCER {
                    pipe.push_value(p * PER_PRODUCER + i).await;
                }
            })
        })
        .collect();

    // Act
    let mut received = Vec::with_capacity(PRODUCERS * PER_PRODUCER);
    for _ in 0..PRODUCERS * PER_PRODUCER {
        received.push(pipe.pull_value().await?);
    }
    for producer in producers {
        producer.await?;
    }

    // Assert
    received.sort_unstable();
    assert_eq!(received, (0..PRODUCERS * PER_PRODUCER).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn test_end_maps_to_channel_ended() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::<i32>::new());
    let producer = {
        let pipe = Arc::clone(&pipe);
        tokio::spawn(async move { pipe.end().await })
    };

    // Act
    let result = pipe.pull_value().await;
    producer.await?;

    // Assert
    assert!(matches!(result, Err(CellflowError::ChannelEnded)));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_push_retracts_value() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::new());
    let token = CancellationToken::new();
    let producer = {
        let pipe = Arc::clone(&pipe);
        let token = token.clone();
        tokio::spawn(async move { pipe.push_cancellable(PipeItem::Value(1), &token).await })
    };
    settle().await;

    // Act
    token.cancel();
    let result = producer.await?;
    let follow_up = {
        let pipe = Arc::clone(&pipe);
        tokio::spawn(async move { pipe.push_value(2).await })
    };

    // Assert
    assert!(matches!(result, Err(CellflowError::Cancelled)));
    assert_eq!(pipe.pull_value().await?, 2);
    follow_up.await?;
    Ok(())
}

#[tokio::test]
async fn test_dropped_push_future_retracts_value() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::new());

    // Act
    let timed_out = tokio::time::timeout(Duration::from_millis(10), pipe.push_value(1)).await;
    let follow_up = {
        let pipe = Arc::clone(&pipe);
        tokio::spawn(async move { pipe.push_value(2).await })
    };

    // Assert
    assert!(timed_out.is_err());
    assert_eq!(pipe.pull_value().await?, 2);
    follow_up.await?;
    Ok(())
}

#[tokio::test]
async fn test_cancelled_pull_loses_nothing() -> anyhow::Result<()> {
    // Arrange
    let pipe = Arc::new(AsyncPipe::new());
    let token = CancellationToken::new();
    let consumer = {
        let pipe = Arc::clone(&pipe);
        let token = token.clone();
        tokio::spawn(async move { pipe.pull_cancellable(&token).await })
    };
    settle().await;

    // Act
    token.cancel();
    let cancelled = consumer.await?;
    let producer = {
        let pipe = Arc::clone(&pipe);
        tokio::spawn(async move { pipe.push_value(7).await })
    };

    // Assert
    assert!(matches!(cancelled, Err(CellflowError::Cancelled)));
    assert_eq!(pipe.pull().await, PipeItem::Value(7));
    producer.await?;
    Ok(())
}

#[tokio::test]
async fn test_from_stream_ends_after_last_item() -> anyhow::Result<()> {
    // Arrange
    let pipe = AsyncPipe::from_stream(futures::stream::iter(vec![1, 2, 3]));

    // Act
    let values: Vec<i32> = pipe.into_stream().collect().await;

    // Assert
    assert_eq!(values, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn test_node_pipe_applies_backpressure() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let pipe = relay.pipe();
    let sender = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move {
            relay.send(1).await;
            relay.send(2).await;
        })
    };

    // Act
    settle().await;
    let blocked = !sender.is_finished();
    let first = pipe.pull_value().await?;
    let second = pipe.pull_value().await?;
    sender.await?;

    // Assert
    assert!(blocked, "the relay delivered without waiting for the consumer");
    assert_eq!((first, second), (1, 2));
    Ok(())
}

#[tokio::test]
async fn test_dropping_node_pipe_releases_waiting_delivery() -> anyhow::Result<()> {
    // Arrange
    let relay = Relay::<i32>::new();
    let pipe = relay.pipe();
    let sender = {
        let relay = Arc::clone(&relay);
        tokio::spawn(async move { relay.send(1).await })
    };
    settle().await;

    // Act
    drop(pipe);
    sender.await?;

    // Assert
    assert_eq!(relay.core().subscription_count(), 0);
    Ok(())
}
