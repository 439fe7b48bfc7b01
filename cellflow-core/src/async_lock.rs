// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Asynchronous binary semaphore used to serialize node delivery.
//!
//! [`AsyncLock`] is a counting lock whose value is `1` when free and `0` when held.
//! Waiters queue in FIFO order and each one is identified by a unique id, so a
//! cancelled or dropped wait removes exactly its own entry and nobody else's.
//!
//! Two optional behaviours depend on which *acquisition chain* is running. A chain is
//! the future passed to [`AsyncLockGuard::scope`] (or [`AsyncLock::run_exclusive`]):
//! code awaited inside it counts as holding the lock, sibling futures polled by the
//! same tokio task do not.
//!
//! - **re-entrancy**: code inside the holder's scope may acquire again without
//!   suspending; the value then goes negative and needs a matching number of releases;
//! - **deadlock detection**: a non-reentrant lock panics when code inside the holder's
//!   scope tries to acquire it a second time. Only compiled in with `debug_assertions`.
//!
//! Acquisitions outside any scope of the lock are never re-entrant.
//!
//! A lock created with [`AsyncLock::new_held`] starts at `0` and works as a signal:
//! one side [`release`](AsyncLock::release)s, the other [`acquire`](AsyncLock::acquire)s.

use crate::{CancellationToken, CellflowError, Result};
use futures::future::{select, Either};
use futures_channel::oneshot;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCK_ID: AtomicU64 = AtomicU64::new(0);
static NEXT_WAITER_ID: AtomicU64 = AtomicU64::new(0);

tokio::task_local! {
    // Ids of the locks whose guarded scope encloses the running future.
    static HELD_LOCKS: Vec<u64>;
}

struct Waiter {
    id: u64,
    grant: oneshot::Sender<()>,
}

struct LockState {
    value: isize,
    waiters: VecDeque<Waiter>,
}

/// FIFO async binary semaphore with cancellable waits.
///
/// # Example
///
/// ```
/// use cellflow_core::AsyncLock;
///
/// # async fn example() {
/// let lock = AsyncLock::new();
///
/// {
///     let _guard = lock.lock().await;
///     assert!(!lock.try_acquire());
/// }
///
/// assert!(lock.try_acquire());
/// lock.release();
/// # }
/// ```
pub struct AsyncLock {
    id: u64,
    state: Mutex<LockState>,
    reentrant: bool,
    deadlock_detection: bool,
}

impl AsyncLock {
    /// A free lock (value 1).
    pub fn new() -> Self {
        Self::with_value(1)
    }

    /// A held lock (value 0), for use as a signal between tasks.
    pub fn new_held() -> Self {
        Self::with_value(0)
    }

    fn with_value(value: isize) -> Self {
        Self {
            id: NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(LockState {
                value,
                waiters: VecDeque::new(),
            }),
            reentrant: false,
            deadlock_detection: false,
        }
    }

    /// Let code inside the holder's scope acquire again without suspending.
    #[must_use]
    pub fn reentrant(mut self) -> Self {
        self.reentrant = true;
        self
    }

    /// Panic when code inside the holder's scope acquires this (non-reentrant) lock.
    ///
    /// No effect in release builds, where such a task waits forever.
    #[must_use]
    pub fn with_deadlock_detection(mut self) -> Self {
        self.deadlock_detection = true;
        self
    }

    pub fn is_reentrant(&self) -> bool {
        self.reentrant
    }

    /// Current semaphore value: `1` free, `0` held, negative when re-entered.
    pub fn value(&self) -> isize {
        self.state.lock().value
    }

    /// Number of queued waiters.
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn tracks_holder(&self) -> bool {
        self.reentrant || self.deadlock_detection
    }

    /// Whether the running future is inside a guarded scope of this lock.
    fn held_here(&self) -> bool {
        self.tracks_holder()
            && HELD_LOCKS
                .try_with(|held| held.contains(&self.id))
                .unwrap_or(false)
    }

    fn take(&self, state: &mut LockState, held: bool) -> bool {
        if state.value > 0 || (self.reentrant && held) {
            state.value -= 1;
            return true;
        }

        self.detect_deadlock(held);
        false
    }

    #[cfg(debug_assertions)]
    fn detect_deadlock(&self, held: bool) {
        if self.deadlock_detection && !self.reentrant && held {
            error!(
                "deadlock detected: lock {} acquired again inside its own guarded scope",
                self.id
            );
            panic!(
                "deadlock detected: lock {} acquired again inside its own guarded scope",
                self.id
            );
        }
    }

    #[cfg(not(debug_assertions))]
    fn detect_deadlock(&self, _held: bool) {}

    fn take_or_enqueue(&self) -> Option<(u64, oneshot::Receiver<()>)> {
        let held = self.held_here();
        let mut state = self.state.lock();
        if self.take(&mut state, held) {
            return None;
        }

        let id = NEXT_WAITER_ID.fetch_add(1, Ordering::Relaxed);
        let (grant, receiver) = oneshot::channel();
        state.waiters.push_back(Waiter { id, grant });
        Some((id, receiver))
    }

    /// Remove a queued waiter. `false` means it was already granted.
    fn dequeue(&self, id: u64) -> bool {
        let mut state = self.state.lock();
        match state.waiters.iter().position(|waiter| waiter.id == id) {
            Some(index) => {
                state.waiters.remove(index);
                true
            }
            None => false,
        }
    }

    /// Non-suspending attempt to take the lock.
    pub fn try_acquire(&self) -> bool {
        let held = self.held_here();
        let mut state = self.state.lock();
        if state.value > 0 || (self.reentrant && held) {
            state.value -= 1;
            true
        } else {
            false
        }
    }

    /// Suspend until the lock is granted.
    ///
    /// Dropping the returned future while queued removes its waiter. If the grant
    /// raced with the drop, the lock is released again.
    pub async fn acquire(&self) {
        let Some((id, receiver)) = self.take_or_enqueue() else {
            return;
        };
        let mut pending = PendingWaiter::new(self, id);

        // The sender is only dropped after a successful send or by `dequeue`,
        // which only this waiter calls for its own id.
        let _ = receiver.await;
        pending.disarm();
    }

    /// Suspend until the lock is granted or `token` is cancelled.
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` without queueing if the token is
    /// already cancelled, or after removing this call's waiter if the token is
    /// cancelled while queued. A grant that beat the cancellation wins.
    pub async fn acquire_cancellable(&self, token: &CancellationToken) -> Result<()> {
        token.check()?;

        let Some((id, mut receiver)) = self.take_or_enqueue() else {
            return Ok(());
        };
        let mut pending = PendingWaiter::new(self, id);

        let cancelled = token.cancelled();
        futures::pin_mut!(cancelled);

        let outcome = match select(&mut receiver, cancelled).await {
            Either::Left(_) => Ok(()),
            Either::Right(((), _)) if self.dequeue(id) => Err(CellflowError::Cancelled),
            Either::Right(_) => Ok(()),
        };
        pending.disarm();
        outcome
    }

    /// Give the lock back and wake the oldest waiter.
    ///
    /// A no-op when the lock is already free.
    pub fn release(&self) {
        let held = self.held_here();
        let mut state = self.state.lock();
        if state.value >= 1 {
            return;
        }

        if self.reentrant && held && state.value < 0 {
            state.value += 1;
            return;
        }

        state.value = 1;
        while let Some(waiter) = state.waiters.pop_front() {
            state.value -= 1;
            if waiter.grant.send(()).is_ok() {
                return;
            }
            state.value += 1;
        }
    }

    /// Acquire and return a guard that releases on drop.
    pub async fn lock(&self) -> AsyncLockGuard<'_> {
        self.acquire().await;
        AsyncLockGuard { lock: self }
    }

    /// Cancellable form of [`lock`](Self::lock).
    ///
    /// # Errors
    /// Returns `Err(CellflowError::Cancelled)` under the same conditions as
    /// [`acquire_cancellable`](Self::acquire_cancellable).
    pub async fn lock_cancellable(&self, token: &CancellationToken) -> Result<AsyncLockGuard<'_>> {
        self.acquire_cancellable(token).await?;
        Ok(AsyncLockGuard { lock: self })
    }

    pub fn try_lock(&self) -> Option<AsyncLockGuard<'_>> {
        self.try_acquire().then_some(AsyncLockGuard { lock: self })
    }

    /// Run `future` while holding the lock, as one acquisition chain.
    ///
    /// See [`AsyncLockGuard::scope`].
    pub async fn run_exclusive<F: Future>(&self, future: F) -> F::Output {
        let guard = self.lock().await;
        guard.scope(future).await
    }
}

impl Default for AsyncLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AsyncLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AsyncLock")
            .field("value", &state.value)
            .field("waiting", &state.waiters.len())
            .field("reentrant", &self.reentrant)
            .field("deadlock_detection", &self.deadlock_detection)
            .finish()
    }
}

/// Queued waiter that gives back its slot if the acquiring future is dropped.
struct PendingWaiter<'a> {
    lock: &'a AsyncLock,
    id: u64,
    armed: bool,
}

impl<'a> PendingWaiter<'a> {
    fn new(lock: &'a AsyncLock, id: u64) -> Self {
        Self {
            lock,
            id,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingWaiter<'_> {
    fn drop(&mut self) {
        if self.armed && !self.lock.dequeue(self.id) {
            self.lock.release();
        }
    }
}

/// RAII guard returned by [`AsyncLock::lock`].
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct AsyncLockGuard<'a> {
    lock: &'a AsyncLock,
}

impl AsyncLockGuard<'_> {
    /// Whether this guard holds `lock`.
    pub fn guards(&self, lock: &AsyncLock) -> bool {
        std::ptr::eq(self.lock, lock)
    }

    /// Run `future` as the holder of this guard's lock.
    ///
    /// Re-entrant acquisition and deadlock detection apply to code awaited inside
    /// `future` only. Other futures polled by the same task are ordinary contenders.
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        if !self.lock.tracks_holder() {
            return future.await;
        }
        let mut held = HELD_LOCKS.try_with(Clone::clone).unwrap_or_default();
        held.push(self.lock.id);
        HELD_LOCKS.scope(held, future).await
    }
}

impl fmt::Debug for AsyncLockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLockGuard").finish_non_exhaustive()
    }
}

impl Drop for AsyncLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
