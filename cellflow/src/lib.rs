// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Cellflow
//!
//! An in-process reactive dataflow engine: a graph of live values connected by
//! operators.
//!
//! ## Overview
//!
//! Every node is a serialized unit of state that delivers values to its subscribers one
//! at a time. Unlike plain event emitters, a node may also have a **current value**:
//! subscribing with `tap` hands it to the new subscriber before anything else, so
//! derived nodes are usable the moment they are built.
//!
//! The workspace is split by concern and this crate re-exports all of it:
//!
//! - [`cellflow_core`] - node protocol, async lock, cancellation, errors
//! - [`cellflow_stream`] - leaf nodes and value operators
//! - [`cellflow_stream_time`] - debounce, throttle, ticker, hold, pulse
//! - [`cellflow_exec`] - backpressured pipes, single-value waits, task helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use cellflow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let first_name = Subject::new(String::from("Ada"));
//!     let last_name = Subject::new(String::from("Lovelace"));
//!
//!     let full_name = first_name
//!         .combine_latest(&last_name)
//!         .await
//!         .map(|(first, last)| format!("{first} {last}"))
//!         .await;
//!     assert_eq!(full_name.current_value().as_deref(), Some("Ada Lovelace"));
//!
//!     last_name.set(String::from("Byron")).await;
//!     assert_eq!(full_name.get().await, "Ada Byron");
//! }
//! ```
//!
//! ## Ownership
//!
//! Subscriptions own the node they subscribe to and nodes only point back weakly.
//! Keeping the last node of a chain (or a subscription to it) keeps the whole chain
//! alive; dropping it tears the chain down, including pending timers.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

pub use cellflow_core;
pub use cellflow_exec;
pub use cellflow_runtime;
pub use cellflow_stream;
pub use cellflow_stream_time;

// Re-export core types
pub use cellflow_core::{
    AnySubscription, AsyncLock, AsyncLockGuard, CancellationToken, CellflowError, Node,
    NodeCore, NodeExt, NodeTask, NodeValue, Result, Subscription,
};

// Re-export leaf nodes and composite node types
pub use cellflow_stream::{
    combine_latest2, combine_latest3, AnyNode, CombineLatest, Constant, Merge, NodeStream,
    Relay, StreamSource, Subject, SwitchToLatest,
};

pub use cellflow_exec::{all, with_timeout, AsyncPipe, PipeItem, TaskSubscription};
pub use cellflow_runtime::{Timer, TokioTimer};
pub use cellflow_stream_time::{Debounce, Hold, Throttle, Ticker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use cellflow_core::{
        CancellationToken, CellflowError, IntoCellflowError, Node, NodeExt, Result, ResultExt,
        Subscription,
    };
    pub use cellflow_exec::{
        AsyncPipe, GetExt, PipeExt, PipeItem, SpawnLatestExt, TaskSubscription,
    };
    pub use cellflow_stream::prelude::*;
    pub use cellflow_stream_time::prelude::*;
}
