// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Execution helpers for cellflow nodes.
//!
//! This crate connects the push-based node graph with code that pulls or awaits:
//!
//! - **[`AsyncPipe`]** - capacity-1 rendezvous channel with in-band end marker, fed by
//!   hand, by a node ([`PipeExt::pipe`]) or by a `Stream` ([`AsyncPipe::from_stream`])
//! - **[`GetExt`]** - await a single value of a node, optionally cancellable or with a
//!   timeout
//! - **[`SpawnLatestExt`]** - run a task per value, cancelling the previous one
//! - **[`with_timeout`]** and **[`all`]** - future helpers returning
//!   [`CellflowError`](cellflow_core::CellflowError)
//!
//! # Example
//!
//! ```
//! use cellflow_core::CancellationToken;
//! use cellflow_exec::GetExt;
//! use cellflow_stream::Subject;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let progress = Subject::new(0u8);
//!
//! let waiter = {
//!     let progress = progress.clone();
//!     tokio::spawn(async move {
//!         let token = CancellationToken::new();
//!         progress.wait_for(|percent| *percent == 100, &token).await
//!     })
//! };
//!
//! for percent in [25, 50, 100] {
//!     progress.set(percent).await;
//! }
//! assert!(waiter.await.unwrap().is_ok());
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod get;
pub mod pipe;
pub mod task;
pub mod task_subscription;

pub use self::get::GetExt;
pub use self::pipe::{AsyncPipe, PipeExt, PipeItem};
pub use self::task::{all, with_timeout};
pub use self::task_subscription::{SpawnLatestExt, TaskSubscription};
