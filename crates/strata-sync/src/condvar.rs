// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Condition Variable
//!
//! `Condvar` blocks a thread until another thread signals it. It works with
//! any `Lockable` held through a `UniqueLock`: waiting releases the lock
//! through the guard's capability handle, parks the thread on the condition
//! variable's address and re-acquires the lock before returning.
//!
//! Waiting for a recursive lock releases one level of ownership only.
//! Spurious wake-ups are possible; re-check the condition after every wait
//! or use `wait_while`.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use strata_sync::{Condvar, Mutex, UniqueLock};
//!
//! let mutex = Mutex::new();
//! let ready = AtomicBool::new(false);
//! let condvar = Condvar::new();
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| {
//!         let _guard = UniqueLock::new(&mutex);
//!         ready.store(true, Ordering::Release);
//!         condvar.notify_one();
//!     });
//!
//!     let mut guard = UniqueLock::new(&mutex);
//!     condvar.wait_while(&mut guard, || !ready.load(Ordering::Acquire));
//!     assert!(guard.owns_lock());
//! });
//! ```

use crate::lockable::Lockable;
use crate::unique_lock::UniqueLock;
use parking_lot_core::{ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use strata_core::dispatch::TraitRef;

/// The outcome of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CondvarStatus {
    /// The thread was woken before the deadline.
    NoTimeout,
    /// The deadline passed.
    Timeout,
}

impl CondvarStatus {
    #[inline]
    pub fn timed_out(self) -> bool {
        matches!(self, CondvarStatus::Timeout)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CondvarStatus::NoTimeout => "no timeout",
            CondvarStatus::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for CondvarStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition variable usable with every lock-like resource.
pub struct Condvar {
    // Threads currently parked on this condition variable. Also gives the
    // type a size, so every instance has its own parking key.
    waiters: AtomicUsize,
}

impl Condvar {
    #[inline]
    pub const fn new() -> Self {
        Self {
            waiters: AtomicUsize::new(0),
        }
    }

    /// Number of threads currently parked on this condition variable.
    #[inline]
    pub fn waiters(&self) -> usize {
        self.waiters.load(Ordering::SeqCst)
    }

    /// Releases the guard's lock, blocks until notified, and re-acquires the
    /// lock.
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not own its lock.
    #[track_caller]
    pub fn wait(&self, guard: &mut UniqueLock<'_>) {
        let mutex = self.owned_lock(guard, "wait");
        self.park(mutex, None);
    }

    /// Like `wait`, but gives up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not own its lock.
    #[track_caller]
    pub fn wait_for(&self, guard: &mut UniqueLock<'_>, timeout: Duration) -> CondvarStatus {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(guard, deadline),
            None => {
                self.wait(guard);
                CondvarStatus::NoTimeout
            }
        }
    }

    /// Like `wait`, but gives up at `deadline`. A deadline in the past
    /// returns `Timeout` without releasing the lock.
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not own its lock.
    #[track_caller]
    pub fn wait_until(&self, guard: &mut UniqueLock<'_>, deadline: Instant) -> CondvarStatus {
        let mutex = self.owned_lock(guard, "wait_until");
        if deadline <= Instant::now() {
            return CondvarStatus::Timeout;
        }
        self.park(mutex, Some(deadline))
    }

    /// Waits until `condition` returns `false`. The condition is evaluated
    /// with the lock held.
    ///
    /// # Panics
    ///
    /// Panics if `guard` does not own its lock.
    #[track_caller]
    pub fn wait_while<F>(&self, guard: &mut UniqueLock<'_>, mut condition: F)
    where
        F: FnMut() -> bool,
    {
        while condition() {
            self.wait(guard);
        }
    }

    /// Wakes one waiting thread. Returns `true` if a thread was woken.
    pub fn notify_one(&self) -> bool {
        // SAFETY: the key is this condition variable's address, which no
        // other primitive parks on.
        let result = unsafe { parking_lot_core::unpark_one(self.key(), |_| DEFAULT_UNPARK_TOKEN) };
        result.unparked_threads > 0
    }

    /// Wakes every waiting thread and returns how many were woken.
    pub fn notify_all(&self) -> usize {
        // SAFETY: see `notify_one`.
        let woken = unsafe { parking_lot_core::unpark_all(self.key(), DEFAULT_UNPARK_TOKEN) };
        log::trace!("Condvar woke {} waiters", woken);
        woken
    }

    #[inline]
    fn key(&self) -> usize {
        self as *const Self as usize
    }

    #[track_caller]
    fn owned_lock<'a>(
        &self,
        guard: &UniqueLock<'a>,
        operation: &str,
    ) -> TraitRef<'a, dyn Lockable + 'a> {
        match guard.mutex() {
            Some(mutex) if guard.owns_lock() => mutex,
            _ => panic!(
                "called `Condvar::{}` with a guard that does not own its lock",
                operation
            ),
        }
    }

    fn park(
        &self,
        mutex: TraitRef<'_, dyn Lockable + '_>,
        deadline: Option<Instant>,
    ) -> CondvarStatus {
        log::trace!("Condvar parking on {}", mutex.type_name());
        let validate = || {
            self.waiters.fetch_add(1, Ordering::SeqCst);
            true
        };
        // SAFETY: the caller's guard owns `mutex`.
        let before_sleep = || unsafe { mutex.get().unlock() };

        // SAFETY: the key is this condition variable's address. `validate`
        // only touches an atomic. `before_sleep` runs outside the queue lock,
        // where unparking threads that wait for the mutex is allowed.
        let result = unsafe {
            parking_lot_core::park(
                self.key(),
                validate,
                before_sleep,
                |_, _| {},
                DEFAULT_PARK_TOKEN,
                deadline,
            )
        };
        self.waiters.fetch_sub(1, Ordering::SeqCst);
        mutex.invoke(|m| m.lock());

        match result {
            ParkResult::TimedOut => CondvarStatus::Timeout,
            _ => CondvarStatus::NoTimeout,
        }
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Condvar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condvar")
            .field("waiters", &self.waiters())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutex::{Mutex, RecursiveMutex, TimedMutex};
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_notify_without_waiters() {
        let cv = Condvar::new();
        assert!(!cv.notify_one());
        assert_eq!(cv.notify_all(), 0);
        assert_eq!(cv.waiters(), 0);
    }

    #[test]
    fn test_wait_for_times_out_and_reacquires() {
        let m = Mutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&m);

        let started = Instant::now();
        let status = cv.wait_for(&mut guard, Duration::from_millis(10));
        assert!(status.timed_out());
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(guard.owns_lock());
        assert!(m.is_locked());
        assert_eq!(cv.waiters(), 0);
    }

    #[test]
    fn test_past_deadline_returns_without_unlocking() {
        let m = TimedMutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&m);
        let status = cv.wait_until(&mut guard, Instant::now() - Duration::from_millis(1));
        assert_eq!(status, CondvarStatus::Timeout);
        assert!(guard.owns_lock());
    }

    #[test]
    fn test_wait_while_skips_wait_when_condition_already_false() {
        let m = RecursiveMutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::new(&m);
        cv.wait_while(&mut guard, || false);
        assert!(guard.owns_lock());
    }

    #[test]
    fn test_notify_one_wakes_parked_waiter() {
        let m = Mutex::new();
        let cv = Condvar::new();
        let ready = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut guard = UniqueLock::new(&m);
                cv.wait_while(&mut guard, || !ready.load(Ordering::SeqCst));
                assert!(guard.owns_lock());
            });

            while cv.waiters() == 0 {
                std::thread::yield_now();
            }
            let _guard = UniqueLock::new(&m);
            ready.store(true, Ordering::SeqCst);
            assert!(cv.notify_one());
        });
        assert!(!m.is_locked());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CondvarStatus::Timeout.to_string(), "timeout");
        assert_eq!(CondvarStatus::NoTimeout.to_string(), "no timeout");
        assert!(!CondvarStatus::NoTimeout.timed_out());
    }

    #[test]
    #[should_panic(expected = "called `Condvar::wait` with a guard that does not own its lock")]
    fn test_wait_without_ownership_is_fatal() {
        let m = Mutex::new();
        let cv = Condvar::new();
        let mut guard = UniqueLock::deferred(&m);
        cv.wait(&mut guard);
    }
}
