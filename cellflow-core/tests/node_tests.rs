// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{AnySubscription, Node, NodeCore, NodeExt};
use parking_lot::Mutex;
use std::sync::Arc;

/// Minimal caching node: `publish` updates the cache and delivers in one step.
struct Cell {
    core: NodeCore<i32>,
    value: Mutex<Option<i32>>,
}

impl Cell {
    fn new(value: Option<i32>) -> Arc<Self> {
        Arc::new(Self {
            core: NodeCore::new(),
            value: Mutex::new(value),
        })
    }

    async fn publish(&self, value: i32) {
        self.core
            .send_updating(value, |v| *self.value.lock() = Some(*v))
            .await;
    }
}

impl Node for Cell {
    type Value = i32;

    fn core(&self) -> &NodeCore<i32> {
        &self.core
    }

    fn current_value(&self) -> Option<i32> {
        *self.value.lock()
    }
}

fn drain(rx: &async_channel::Receiver<i32>) -> Vec<i32> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test]
async fn test_subscribe_does_not_emit_current_value() {
    // Arrange
    let cell = Cell::new(Some(1));
    let (tx, rx) = async_channel::unbounded();

    // Act
    let _subscription = cell.subscribe(move |v| {
        let tx = tx.clone();
        async move {
            tx.send(v).await.ok();
        }
    });
    cell.publish(2).await;

    // Assert
    assert_eq!(drain(&rx), vec![2]);
}

#[tokio::test]
async fn test_tap_emits_current_value_before_later_values() {
    // Arrange
    let cell = Cell::new(Some(1));
    let (tx, rx) = async_channel::unbounded();

    // Act
    let _subscription = cell
        .tap(move |v| {
            let tx = tx.clone();
            async move {
                tx.send(v).await.ok();
            }
        })
        .await;
    cell.publish(2).await;

    // Assert
    assert_eq!(drain(&rx), vec![1, 2]);
}

#[tokio::test]
async fn test_tap_without_current_value_emits_nothing() {
    // Arrange
    let cell = Cell::new(None);
    let (tx, rx) = async_channel::unbounded();

    // Act
    let _subscription = cell
        .tap(move |v| {
            let tx = tx.clone();
            async move {
                tx.send(v).await.ok();
            }
        })
        .await;

    // Assert
    assert!(drain(&rx).is_empty());
}

#[tokio::test]
async fn test_subscribe_with_current_routes_current_value_separately() {
    // Arrange
    let cell = Cell::new(Some(7));
    let (tx, rx) = async_channel::unbounded();
    let (current_tx, current_rx) = async_channel::unbounded();

    // Act
    let _subscription = cell
        .subscribe_with_current(
            move |v| {
                let tx = tx.clone();
                async move {
                    tx.send(v).await.ok();
                }
            },
            move |v| async move {
                current_tx.send(v).await.ok();
            },
        )
        .await;
    cell.publish(8).await;

    // Assert
    assert_eq!(drain(&current_rx), vec![7]);
    assert_eq!(drain(&rx), vec![8]);
}

#[tokio::test]
async fn test_delivery_follows_registration_order() {
    // Arrange
    let cell = Cell::new(None);
    let (tx, rx) = async_channel::unbounded();
    let subscriptions: Vec<_> = (0..3)
        .map(|id| {
            let tx = tx.clone();
            cell.subscribe(move |v| {
                let tx = tx.clone();
                async move {
                    tx.send(id * 100 + v).await.ok();
                }
            })
        })
        .collect();

    // Act
    cell.send(1).await;

    // Assert
    assert_eq!(drain(&rx), vec![1, 101, 201]);
    drop(subscriptions);
}

#[tokio::test]
async fn test_dropped_subscription_is_skipped_and_pruned() {
    // Arrange
    let cell = Cell::new(None);
    let (tx, rx) = async_channel::unbounded();
    let make = |id: i32| {
        let tx = tx.clone();
        move |v: i32| {
            let tx = tx.clone();
            async move {
                tx.send(id * 100 + v).await.ok();
            }
        }
    };
    let first = cell.subscribe(make(0));
    let second = cell.subscribe(make(1));
    assert_eq!(cell.core().subscription_count(), 2);

    // Act
    drop(first);
    cell.send(5).await;

    // Assert
    assert_eq!(drain(&rx), vec![105]);
    assert_eq!(cell.core().subscription_count(), 1);
    drop(second);
    assert_eq!(cell.core().subscription_count(), 0);
}

#[tokio::test]
async fn test_subscription_keeps_node_alive() {
    // Arrange
    let cell = Cell::new(Some(3));
    let weak = Arc::downgrade(&cell);
    let subscription = cell.subscribe(|_| async {});

    // Act
    drop(cell);

    // Assert
    assert!(weak.upgrade().is_some());
    drop(subscription);
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn test_erased_subscriptions_stay_registered() {
    // Arrange
    let cell = Cell::new(None);
    let (tx, rx) = async_channel::unbounded();

    // Act
    let bag: Vec<AnySubscription> = vec![cell
        .subscribe(move |v| {
            let tx = tx.clone();
            async move {
                tx.send(v).await.ok();
            }
        })
        .erase()];
    cell.send(9).await;

    // Assert
    assert_eq!(drain(&rx), vec![9]);
    drop(bag);
    assert_eq!(cell.core().subscription_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_reach_every_subscriber_in_one_order() -> anyhow::Result<()> {
    // Arrange
    let cell = Cell::new(None);
    let (tx_a, rx_a) = async_channel::unbounded();
    let (tx_b, rx_b) = async_channel::unbounded();
    let _a = cell.subscribe(move |v| {
        let tx = tx_a.clone();
        async move {
            tokio::task::yield_now().await;
            tx.send(v).await.ok();
        }
    });
    let _b = cell.subscribe(move |v| {
        let tx = tx_b.clone();
        async move {
            tx.send(v).await.ok();
        }
    });

    // Act
    let handles: Vec<_> = (0..100)
        .map(|v| {
            let cell = cell.clone();
            tokio::spawn(async move { cell.publish(v).await })
        })
        .collect();
    for handle in handles {
        handle.await?;
    }

    // Assert
    let seen_a = drain(&rx_a);
    let seen_b = drain(&rx_b);
    assert_eq!(seen_a, seen_b);
    let mut sorted = seen_a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..100).collect::<Vec<_>>());
    assert_eq!(cell.current_value(), seen_a.last().copied());
    Ok(())
}

#[tokio::test]
async fn test_each_tap_gets_one_initial_value_in_registration_order() {
    // Arrange
    let cell = Cell::new(Some(1));
    let (tx, rx) = async_channel::unbounded();
    let tagged = |id: i32| {
        let tx = tx.clone();
        move |v: i32| {
            let tx = tx.clone();
            async move {
                tx.send(id * 100 + v).await.ok();
            }
        }
    };

    // Act
    let _first = cell.tap(tagged(0)).await;
    let _second = cell.tap(tagged(1)).await;
    let initial = drain(&rx);
    cell.publish(2).await;

    // Assert
    assert_eq!(initial, vec![1, 101]);
    assert_eq!(drain(&rx), vec![2, 102]);
}

#[tokio::test]
async fn test_sends_joined_in_one_task_are_serialized() -> anyhow::Result<()> {
    // Arrange
    let cell = Cell::new(None);
    let (tx, rx) = async_channel::unbounded();
    let _subscription = cell.subscribe(move |v| {
        let tx = tx.clone();
        async move {
            tokio::task::yield_now().await;
            tx.send(v).await.ok();
        }
    });

    // Act
    tokio::spawn({
        let cell = cell.clone();
        async move {
            tokio::join!(cell.publish(1), cell.publish(2));
        }
    })
    .await?;

    // Assert
    assert_eq!(drain(&rx), vec![1, 2]);
    assert_eq!(cell.current_value(), Some(2));
    Ok(())
}

#[cfg(debug_assertions)]
#[tokio::test]
async fn test_send_from_own_subscriber_panics() {
    // Arrange
    let cell = Cell::new(None);
    let weak = Arc::downgrade(&cell);
    let _subscription = cell.subscribe(move |v| {
        let weak = weak.clone();
        async move {
            if let Some(cell) = weak.upgrade() {
                cell.send(v + 1).await;
            }
        }
    });

    // Act
    let result = tokio::spawn({
        let cell = cell.clone();
        async move { cell.send(1).await }
    })
    .await;

    // Assert
    let error = result.expect_err("nested send must panic");
    assert!(error.is_panic());
}
