// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_channel::Receiver;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Receive the next value or panic after `timeout_ms`.
pub async fn recv_timeout<T>(receiver: &Receiver<T>, timeout_ms: u64) -> T {
    match timeout(Duration::from_millis(timeout_ms), receiver.recv()).await {
        Ok(Ok(value)) => value,
        Ok(Err(_)) => panic!("Expected a value but the channel is closed"),
        Err(_) => panic!("Timeout: No value received within {timeout_ms} ms"),
    }
}

/// Panic if a value arrives within `timeout_ms`.
pub async fn assert_no_recv<T>(receiver: &Receiver<T>, timeout_ms: u64) {
    tokio::select! {
        received = receiver.recv() => {
            if received.is_ok() {
                panic!("Unexpected value received, expected no output");
            }
        }
        _ = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Let spawned tasks run until they block, without moving the clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
