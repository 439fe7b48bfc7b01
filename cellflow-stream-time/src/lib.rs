// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-based nodes for the cellflow reactive dataflow engine.
//!
//! Every operator in this crate owns at most one delayed task, a
//! [`NodeTask`](cellflow_core::NodeTask) that is cancelled when the node is dropped.
//! Deadlines and sleeps go through the [`Timer`](cellflow_runtime::Timer) trait;
//! the plain constructors use [`TokioTimer`](cellflow_runtime::TokioTimer), so
//! `tokio::time::pause()` drives them in tests.
//!
//! # Overview
//!
//! - **[`Debounce`]** - `.debounce(interval)`, trailing-edge debounce
//! - **[`Throttle`]** - `.throttle(interval)`, leading and trailing rate limit
//! - **[`Ticker`]** - periodic `()` leaf node with drift control
//! - **[`Hold`]** - `.hold(interval)` on `bool` nodes
//! - **[`PulseExt`]** - `.pulse(length)`, `Some(value)` followed by `None`
//!
//! # Example
//!
//! ```rust
//! use cellflow_core::Node;
//! use cellflow_stream::Subject;
//! use cellflow_stream_time::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let query = Subject::new(String::from("c"));
//! let settled = query.debounce(Duration::from_millis(300)).await;
//!
//! query.set(String::from("ce")).await;
//! query.set(String::from("cell")).await;
//!
//! // Nothing emitted yet, the query is still changing
//! assert_eq!(settled.current_value(), None);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;

pub mod debounce;
pub mod hold;
pub mod prelude;
pub mod pulse;
pub mod throttle;
pub mod ticker;

pub use self::debounce::{Debounce, DebounceExt};
pub use self::hold::{Hold, HoldExt};
pub use self::pulse::PulseExt;
pub use self::throttle::{Throttle, ThrottleExt};
pub use self::ticker::Ticker;
