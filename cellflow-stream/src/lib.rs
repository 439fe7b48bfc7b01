// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Leaf nodes and value operators for the cellflow reactive dataflow engine.
//!
//! Every node in this crate is built on [`cellflow_core::Node`]. Operators are
//! provided via extension traits on `Arc<N>` and return the new node, already
//! subscribed to its upstream.
//!
//! # Architecture
//!
//! - **Leaf nodes**: [`Subject`] (mutable value), [`SyncSubject`] (writable from
//!   synchronous code), [`Relay`] (no current value), [`Constant`] (never changes) and
//!   [`StreamSource`] (fed by a `futures::Stream`);
//! - **One-to-one operators**: `map`, `filter`, `compact_map`, `flat_map`, `scan`,
//!   `self_scan`, `first`, `drop_while`, `remove_duplicates`, `with_initial_value`,
//!   `inspect` and `any`;
//! - **Combining operators**: [`CombineLatest`], [`Merge`] and [`SwitchToLatest`];
//! - **Delivery**: [`Dispatch`] moves delivery onto a task of its own;
//! - **Bridges**: [`NodeStream`] (node to stream) and `bind_to_subject`/`bind_to_relay`.
//!
//! # Current Values
//!
//! An operator has a current value only when its upstream had one at construction
//! time. Its current value is then always the last value it emitted. Operators whose
//! upstream had none never report one, see [`cellflow_core::CurrentValue`].
//!
//! # Ownership
//!
//! An operator owns its upstream subscription, which owns the upstream node. Nodes
//! only reference their subscribers weakly: dropping the last handle to the end of a
//! chain tears the whole chain down.
//!
//! ```
//! use cellflow_core::Node;
//! use cellflow_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let input = Subject::new(1);
//! let doubled = input.map(|n| n * 2).await;
//! assert_eq!(input.core().subscription_count(), 1);
//!
//! drop(doubled);
//! assert_eq!(input.core().subscription_count(), 0);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
#[macro_use]
mod logging;
mod transform;

pub mod any;
pub mod bind;
pub mod combine_latest;
pub mod compact_map;
pub mod constant;
pub mod dispatch;
pub mod drop_while;
pub mod filter;
pub mod first;
pub mod flat_map;
pub mod inspect;
pub mod into_stream;
pub mod map;
pub mod merge;
pub mod prelude;
pub mod relay;
pub mod remove_duplicates;
pub mod scan;
pub mod self_scan;
pub mod source;
pub mod subject;
pub mod switch_to_latest;
pub mod sync_subject;
pub mod with_initial_value;

pub use self::any::{AnyExt, AnyNode};
pub use self::bind::BindExt;
pub use self::combine_latest::{combine_latest2, combine_latest3, CombineLatest, CombineLatestExt};
pub use self::compact_map::{CompactExt, CompactMap, CompactMapExt};
pub use self::constant::Constant;
pub use self::dispatch::{BufferingPolicy, Dispatch, DispatchExt};
pub use self::drop_while::{DropWhile, DropWhileExt};
pub use self::filter::{Filter, FilterExt};
pub use self::first::{First, FirstExt};
pub use self::flat_map::{FlatMap, FlatMapExt, FlattenExt};
pub use self::inspect::{Inspect, InspectExt};
pub use self::into_stream::{IntoStreamExt, NodeStream};
pub use self::map::{Map, MapExt};
pub use self::merge::{Merge, MergeExt};
pub use self::relay::Relay;
pub use self::remove_duplicates::{RemoveDuplicates, RemoveDuplicatesExt};
pub use self::scan::{Scan, ScanExt};
pub use self::self_scan::{SelfScan, SelfScanExt};
pub use self::source::{IntoNodeExt, StreamSource};
pub use self::subject::Subject;
pub use self::switch_to_latest::{MapToLatestExt, SwitchToLatest, SwitchToLatestExt};
pub use self::sync_subject::{SyncSender, SyncSubject};
pub use self::with_initial_value::{WithInitialValue, WithInitialValueExt};
