// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting the leaf nodes and every operator trait.
//!
//! ```
//! use cellflow_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let counter = Subject::new(1);
//! let positive = counter.map(|n| n * 2).await.filter(|n| *n > 0).await;
//! # drop(positive);
//! # }
//! ```
//!
//! # Contents
//!
//! ## Extension Traits (Operators)
//!
//! - [`AnyExt`] - Type-erase a node
//! - [`BindExt`] - Feed a node into a subject or relay
//! - [`CombineLatestExt`] - Join the latest values of several nodes
//! - [`CompactExt`], [`CompactMapExt`] - Transform and drop `None`s
//! - [`DispatchExt`] - Deliver from a separate task
//! - [`DropWhileExt`] - Skip values while a predicate holds
//! - [`FilterExt`] - Keep values matching a predicate
//! - [`FirstExt`] - Emit only the first value
//! - [`FlatMapExt`], [`FlattenExt`] - One value in, many values out
//! - [`InspectExt`] - Log every value
//! - [`IntoNodeExt`] - Turn a `futures::Stream` into a node
//! - [`IntoStreamExt`] - Turn a node into a `futures::Stream`
//! - [`MapExt`] - Transform values
//! - [`MapToLatestExt`], [`SwitchToLatestExt`] - Follow the latest inner node
//! - [`MergeExt`] - Forward the values of two nodes
//! - [`RemoveDuplicatesExt`] - Suppress consecutive duplicates
//! - [`ScanExt`], [`SelfScanExt`] - Stateful accumulation
//! - [`WithInitialValueExt`] - Start from a given current value

pub use crate::any::{AnyExt, AnyNode};
pub use crate::bind::BindExt;
pub use crate::combine_latest::{combine_latest2, combine_latest3, CombineLatest, CombineLatestExt};
pub use crate::compact_map::{CompactExt, CompactMapExt};
pub use crate::constant::Constant;
pub use crate::dispatch::{BufferingPolicy, DispatchExt};
pub use crate::drop_while::DropWhileExt;
pub use crate::filter::FilterExt;
pub use crate::first::FirstExt;
pub use crate::flat_map::{FlatMapExt, FlattenExt};
pub use crate::inspect::InspectExt;
pub use crate::into_stream::{IntoStreamExt, NodeStream};
pub use crate::map::MapExt;
pub use crate::merge::{Merge, MergeExt};
pub use crate::relay::Relay;
pub use crate::remove_duplicates::RemoveDuplicatesExt;
pub use crate::scan::ScanExt;
pub use crate::self_scan::SelfScanExt;
pub use crate::source::{IntoNodeExt, StreamSource};
pub use crate::subject::Subject;
pub use crate::switch_to_latest::{MapToLatestExt, SwitchToLatestExt};
pub use crate::sync_subject::{SyncSender, SyncSubject};
pub use crate::with_initial_value::WithInitialValueExt;
