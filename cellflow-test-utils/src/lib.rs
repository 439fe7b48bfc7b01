// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the cellflow reactive dataflow engine.
//!
//! This crate provides helpers for observing node emissions in tests. It is designed
//! for use in development and testing only, not for production code.
//!
//! # Key Types
//!
//! ## `Recorder<V>`
//!
//! A subscription that pushes every emission into an unbounded channel:
//!
//! ```rust
//! use cellflow_core::{Node, NodeCore, NodeExt};
//! use cellflow_test_utils::Recorder;
//! use std::sync::Arc;
//!
//! struct Ping(NodeCore<u32>);
//!
//! impl Node for Ping {
//!     type Value = u32;
//!     fn core(&self) -> &NodeCore<u32> {
//!         &self.0
//!     }
//!     fn current_value(&self) -> Option<u32> {
//!         None
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let node = Arc::new(Ping(NodeCore::new()));
//! let recorder = Recorder::subscribe(&node);
//!
//! node.send(1).await;
//! node.send(2).await;
//!
//! assert_eq!(recorder.take(), vec![1, 2]);
//! # }
//! ```
//!
//! ## Timing
//!
//! Time-based tests run with `tokio::time::pause()`. Use [`Recorder::take`] after
//! `tokio::time::advance` to check what was emitted so far: [`recv_timeout`] and
//! [`assert_no_recv`] sleep, and sleeping lets paused time jump ahead.
//!
//! # Module Organization
//!
//! - `recorder` - [`Recorder`]
//! - `helpers` - Channel assertions and [`settle`]
//! - `fixtures` - `Person`, `Animal` and `TestData` fixtures

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod fixtures;
pub mod helpers;
pub mod recorder;

pub use fixtures::{Animal, Person, TestData};
pub use helpers::{assert_no_recv, recv_timeout, settle};
pub use recorder::Recorder;
