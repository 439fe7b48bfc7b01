// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core building blocks of the cellflow reactive dataflow engine.
//!
//! - [`AsyncLock`]: FIFO async binary semaphore with cancellable waits, optional task
//!   re-entrancy and deadlock detection;
//! - [`Node`], [`NodeCore`], [`NodeExt`]: the subscription and delivery protocol every
//!   node implements;
//! - [`CurrentValue`]: the cached current value of operator nodes;
//! - [`CancellationToken`] and [`NodeTask`]: cancellation of waits and background work;
//! - [`CellflowError`]: the error type of every fallible operation.

#[macro_use]
mod logging;

pub mod async_lock;
pub mod caching_core;
pub mod cancellation_token;
pub mod current_value;
pub mod error;
pub mod node;
pub mod node_task;
pub mod subscription;

pub use self::async_lock::{AsyncLock, AsyncLockGuard};
pub use self::caching_core::CachingCore;
pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::current_value::CurrentValue;
pub use self::error::{CellflowError, IntoCellflowError, Result, ResultExt};
pub use self::node::{subscribe_weak, tap_weak, Node, NodeCore, NodeExt, NodeValue};
pub use self::node_task::NodeTask;
pub use self::subscription::{AnySubscription, Subscription, SubscriptionEntry};
