// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow::prelude::*;
use cellflow_test_utils::{settle, Recorder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{advance, pause};

#[tokio::test]
async fn test_form_validity_follows_both_fields() -> anyhow::Result<()> {
    // Arrange
    let username = Subject::new(String::new());
    let password = Subject::new(String::new());
    let valid = username
        .combine_latest(&password)
        .await
        .map(|(user, pass)| !user.is_empty() && pass.len() >= 8)
        .await
        .remove_duplicates()
        .await;
    let recorder = Recorder::tap(&valid).await;

    // Act
    username.set(String::from("ada")).await;
    password.set(String::from("short")).await;
    password.set(String::from("analytical-engine")).await;
    username.set(String::from("ada.lovelace")).await;

    // Assert
    assert_eq!(recorder.take(), vec![false, true]);
    assert!(valid.get().await);
    Ok(())
}

#[tokio::test]
async fn test_search_follows_latest_debounced_query() -> anyhow::Result<()> {
    pause();

    // Arrange
    let query = Relay::<String>::new();
    let results = query
        .debounce(Duration::from_millis(300))
        .await
        .map_to_latest(|text| async move { Subject::new(format!("results for {text}")) })
        .await;
    let recorder = Recorder::subscribe(&results);

    // Act
    for text in ["r", "ru", "rust"] {
        query.send(String::from(text)).await;
        advance(Duration::from_millis(100)).await;
    }
    advance(Duration::from_millis(300)).await;
    settle().await;

    // Assert
    assert_eq!(recorder.take(), vec![String::from("results for rust")]);
    assert_eq!(
        results.current_value().as_deref(),
        Some("results for rust")
    );
    Ok(())
}

#[tokio::test]
async fn test_running_total_through_backpressured_pipe() -> anyhow::Result<()> {
    // Arrange
    let numbers = Relay::<u32>::new();
    let totals = numbers
        .filter(|n| n % 2 == 0)
        .await
        .scan(0, |total, n| total + n)
        .await;
    let pipe = totals.pipe();
    let producer = {
        let numbers = Arc::clone(&numbers);
        tokio::spawn(async move {
            for n in 1..=6 {
                numbers.send(n).await;
            }
        })
    };

    // Act
    let mut received = Vec::new();
    for _ in 0..3 {
        received.push(pipe.pull_value().await?);
    }
    producer.await?;

    // Assert
    assert_eq!(received, vec![2, 6, 12]);
    assert_eq!(totals.current_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_wait_for_ticker_count() -> anyhow::Result<()> {
    pause();

    // Arrange
    let ticker = Ticker::new(Duration::from_millis(100));
    let count = ticker.scan(0u32, |count, ()| count + 1).await;
    let token = CancellationToken::new();

    // Act
    let reached = count.wait_for(|count| *count >= 3, &token).await;

    // Assert
    assert!(reached.is_ok());
    assert_eq!(count.current_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_dropping_chain_end_releases_upstream() -> anyhow::Result<()> {
    // Arrange
    let source = Subject::new(1);
    let doubled = source.map(|n| n * 2).await.throttle(Duration::from_secs(1)).await;
    assert_eq!(source.core().subscription_count(), 1);

    // Act
    drop(doubled);

    // Assert
    assert_eq!(source.core().subscription_count(), 0);
    Ok(())
}
