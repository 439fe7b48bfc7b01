// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::{Relay, Subject};
use cellflow_stream_time::prelude::*;
use cellflow_test_utils::fixtures::{person_alice, person_bob, person_charlie};
use cellflow_test_utils::{settle, Recorder, TestData};
use std::time::Duration;
use tokio::time::{advance, pause, Instant};

async fn advance_to(start: Instant, millis: u64) {
    let target = start + Duration::from_millis(millis);
    let now = Instant::now();
    if target > now {
        advance(target - now).await;
    }
    settle().await;
}

// Paused sleeps fire on a millisecond tick at or after their deadline.
const TIMER_SLACK_MS: u64 = 10;

async fn advance_past(start: Instant, millis: u64) {
    advance_to(start, millis + TIMER_SLACK_MS).await;
}

#[tokio::test]
async fn test_debounce_emits_after_quiet_period() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let relay = Relay::<TestData>::new();
    let debounced = relay.debounce(Duration::from_millis(500)).await;
    let recorder = Recorder::subscribe(&debounced);

    // Act
    relay.send(person_alice()).await;
    settle().await;

    // Assert
    advance_to(start, 400).await;
    assert!(recorder.take().is_empty());

    advance_past(start, 500).await;
    assert_eq!(recorder.take(), vec![person_alice()]);
    Ok(())
}

#[tokio::test]
async fn test_debounce_resets_on_new_value() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let relay = Relay::<TestData>::new();
    let debounced = relay.debounce(Duration::from_millis(500)).await;
    let recorder = Recorder::subscribe(&debounced);

    // Act
    relay.send(person_alice()).await;
    advance_to(start, 300).await;
    relay.send(person_bob()).await;

    // Assert
    advance_to(start, 600).await;
    assert!(recorder.take().is_empty());

    advance_past(start, 800).await;
    assert_eq!(recorder.take(), vec![person_bob()]);
    Ok(())
}

#[tokio::test]
async fn test_debounce_timing_table() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let relay = Relay::<u32>::new();
    let debounced = relay.debounce(Duration::from_millis(1000)).await;
    let recorder = Recorder::subscribe(&debounced);
    let mut emitted = Vec::new();

    // Act
    let timeline = [
        (0, Some(1)),
        (200, Some(2)),
        (1200, None),
        (1300, Some(3)),
        (2300, None),
        (3000, Some(4)),
        (3050, Some(5)),
        (3100, Some(6)),
        (4100, None),
    ];
    for (at, input) in timeline {
        match input {
            Some(value) => {
                advance_to(start, at).await;
                emitted.extend(recorder.take().into_iter().map(|value| (at, value)));
                relay.send(value).await;
            }
            None => {
                advance_past(start, at).await;
                emitted.extend(recorder.take().into_iter().map(|value| (at, value)));
            }
        }
    }

    // Assert
    assert_eq!(emitted, vec![(1200, 2), (2300, 3), (4100, 6)]);
    Ok(())
}

#[tokio::test]
async fn test_debounce_current_value_after_first_emission() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let subject = Subject::new(person_alice());
    let debounced = subject.debounce(Duration::from_millis(100)).await;

    // Act
    assert_eq!(debounced.current_value(), None);
    subject.set(person_charlie()).await;
    advance_past(start, 100).await;

    // Assert
    assert_eq!(debounced.current_value(), Some(person_charlie()));
    Ok(())
}

#[tokio::test]
async fn test_debounce_of_relay_never_reports_current_value() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let relay = Relay::<u32>::new();
    let debounced = relay.debounce(Duration::from_millis(100)).await;
    let recorder = Recorder::subscribe(&debounced);

    // Act
    relay.send(1).await;
    advance_past(start, 100).await;

    // Assert
    assert_eq!(recorder.take(), vec![1]);
    assert_eq!(debounced.current_value(), None);
    Ok(())
}

#[tokio::test]
async fn test_dropped_debounce_cancels_pending_emission() -> anyhow::Result<()> {
    pause();

    // Arrange
    let start = Instant::now();
    let relay = Relay::<u32>::new();
    let debounced = relay.debounce(Duration::from_millis(100)).await;
    relay.send(1).await;
    assert_eq!(relay.core().subscription_count(), 1);

    // Act
    drop(debounced);
    advance_past(start, 200).await;

    // Assert
    assert_eq!(relay.core().subscription_count(), 0);
    Ok(())
}
