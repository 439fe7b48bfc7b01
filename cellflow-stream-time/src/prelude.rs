// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Prelude module re-exporting all time-based node traits and types.
//!
//! # Contents
//!
//! - [`DebounceExt`] - Emit only after a quiet period
//! - [`ThrottleExt`] - Emit at most once per interval
//! - [`HoldExt`] - Stretch `true` values
//! - [`PulseExt`] - Turn values into `Some`/`None` pulses
//! - [`Ticker`] - Periodic emitter

pub use crate::debounce::{Debounce, DebounceExt};
pub use crate::hold::{Hold, HoldExt};
pub use crate::pulse::PulseExt;
pub use crate::throttle::{Throttle, ThrottleExt};
pub use crate::ticker::Ticker;
pub use cellflow_runtime::{TokioTimer, Timer};
