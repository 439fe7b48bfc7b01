// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time source for cellflow's delayed emissions.
//!
//! Debounce, throttle and tickers never read the clock directly: they go through
//! a [`Timer`](timer::Timer) so tests can drive them with paused tokio time.

pub mod impls;
pub mod timer;

#[cfg(feature = "runtime-tokio")]
pub use self::impls::tokio::TokioTimer;
pub use self::timer::Timer;
