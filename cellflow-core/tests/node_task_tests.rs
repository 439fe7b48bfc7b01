// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::NodeTask;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn test_task_runs_to_completion() {
    // Arrange
    let counter = Arc::new(AtomicUsize::new(0));
    let seen = counter.clone();

    // Act
    let task = NodeTask::spawn(|_cancel| async move {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    task.join().await;

    // Assert
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_stops_task_that_ignores_its_token() {
    // Arrange
    let ticks = Arc::new(AtomicUsize::new(0));
    let seen = ticks.clone();
    let task = NodeTask::spawn(|_cancel| async move {
        loop {
            tokio::time::sleep(Duration::from_millis(10)).await;
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    sleep(Duration::from_millis(25)).await;
    let before = ticks.load(Ordering::SeqCst);

    // Act
    drop(task);
    sleep(Duration::from_millis(100)).await;

    // Assert
    assert!(before >= 1);
    assert_eq!(ticks.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn test_cancel_is_visible_to_task() {
    // Arrange
    let task = NodeTask::spawn(|cancel| async move {
        cancel.cancelled().await;
    });

    // Act
    task.cancel();

    // Assert
    assert!(task.is_cancelled());
    task.join().await;
}
