// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use cellflow_core::{Node, NodeExt};
use cellflow_stream::prelude::*;
use cellflow_test_utils::fixtures::{animal_dog, animal_spider, person_alice, person_bob};
use cellflow_test_utils::{Recorder, TestData};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::advance;

#[tokio::test(start_paused = true)]
async fn test_combine_latest_waits_for_both_then_reemits_pairs() -> anyhow::Result<()> {
    // Arrange
    let people = Relay::<TestData>::new();
    let animals = Relay::<TestData>::new();
    let pairs = people.combine_latest(&animals).await;
    let recorder = Recorder::subscribe(&pairs);

    // Act & Assert: t=0
    people.send(person_alice()).await;
    assert!(recorder.take().is_empty());
    assert_eq!(pairs.current_value(), None);

    // t=50
    advance(Duration::from_millis(50)).await;
    animals.send(animal_dog()).await;
    assert_eq!(recorder.take(), vec![(person_alice(), animal_dog())]);

    // t=100
    advance(Duration::from_millis(50)).await;
    people.send(person_bob()).await;
    assert_eq!(recorder.take(), vec![(person_bob(), animal_dog())]);
    assert_eq!(pairs.current_value(), Some((person_bob(), animal_dog())));
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_populates_from_current_values() -> anyhow::Result<()> {
    // Arrange
    let people = Subject::new(person_alice());
    let animals = Subject::new(animal_dog());

    // Act
    let pairs = people.combine_latest(&animals).await;
    let recorder = Recorder::tap(&pairs).await;
    animals.set(animal_spider()).await;

    // Assert
    assert_eq!(
        recorder.take(),
        vec![
            (person_alice(), animal_dog()),
            (person_alice(), animal_spider())
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_combine_latest3_mixed_types() -> anyhow::Result<()> {
    // Arrange
    let count = Subject::new(1);
    let name = Relay::<String>::new();
    let enabled = Constant::new(true);
    let rows = combine_latest3(&count, &name, &enabled).await;

    // Act
    name.send("cells".to_string()).await;
    count.set(2).await;

    // Assert
    assert_eq!(rows.current_value(), Some((2, "cells".to_string(), true)));
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_with_n_upstreams() -> anyhow::Result<()> {
    // Arrange
    let subjects: Vec<_> = (0..4).map(Subject::new).collect();

    // Act
    let rows = CombineLatest::new(&subjects).await;
    let recorder = Recorder::subscribe(&rows);
    subjects[2].set(20).await;

    // Assert
    assert_eq!(rows.arity(), 4);
    assert_eq!(recorder.take(), vec![vec![0, 1, 20, 3]]);
    Ok(())
}

#[tokio::test]
async fn test_combine_latest_with_appends_others() -> anyhow::Result<()> {
    // Arrange
    let first = Subject::new('a');
    let others = vec![Relay::<char>::new(), Relay::<char>::new()];
    let rows = first.combine_latest_with(&others).await;

    // Act
    others[0].send('b').await;
    assert_eq!(rows.current_value(), None);
    others[1].send('c').await;

    // Assert
    assert_eq!(rows.current_value(), Some(vec!['a', 'b', 'c']));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_combine_latest_concurrent_upstreams_lose_no_update() -> anyhow::Result<()> {
    // Arrange
    const ROUNDS: u32 = 200;
    let left = Subject::new(0_u32);
    let right = Subject::new(0_u32);
    let pairs = left.combine_latest(&right).await;
    let recorder = Recorder::subscribe(&pairs);

    // Act
    let left_task = {
        let left = Arc::clone(&left);
        tokio::spawn(async move {
            for value in 1..=ROUNDS {
                left.set(value).await;
            }
        })
    };
    let right_task = {
        let right = Arc::clone(&right);
        tokio::spawn(async move {
            for value in 1..=ROUNDS {
                right.set(value).await;
            }
        })
    };
    left_task.await?;
    right_task.await?;

    // Assert
    let emitted = recorder.take();
    assert_eq!(emitted.len(), 2 * ROUNDS as usize);
    assert_eq!(emitted.last(), Some(&(ROUNDS, ROUNDS)));
    assert_eq!(pairs.current_value(), Some((ROUNDS, ROUNDS)));
    Ok(())
}
