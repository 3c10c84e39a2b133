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

//! # Exclusive Locks
//!
//! Native exclusive lock primitives backed by `parking_lot` raw locks. They
//! carry no data; pair them with a guard from this crate.
//!
//! | type                  | timed | recursive |
//! |-----------------------|-------|-----------|
//! | `Mutex`               |       |           |
//! | `TimedMutex`          | yes   |           |
//! | `RecursiveMutex`      |       | yes       |
//! | `RecursiveTimedMutex` | yes   | yes       |

use crate::lockable::{Lockable, TimedLockable};
use parking_lot::lock_api::{RawMutex as _, RawMutexTimed as _, RawReentrantMutex};
use parking_lot::{RawMutex, RawThreadId};
use std::time::{Duration, Instant};
use strata_core::dispatch::Describe;

type RawRecursive = RawReentrantMutex<RawMutex, RawThreadId>;

/// A plain exclusive lock. Bounded waits are not supported.
pub struct Mutex {
    raw: RawMutex,
}

impl Mutex {
    #[inline]
    pub const fn new() -> Self {
        Self { raw: RawMutex::INIT }
    }

    /// Returns `true` if some thread holds the lock.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for Mutex {
    fn type_name(&self) -> &'static str {
        "Mutex"
    }
}

impl Lockable for Mutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock() }
    }
}

impl std::fmt::Debug for Mutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// An exclusive lock supporting bounded waits.
pub struct TimedMutex {
    raw: RawMutex,
}

impl TimedMutex {
    #[inline]
    pub const fn new() -> Self {
        Self { raw: RawMutex::INIT }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for TimedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for TimedMutex {
    fn type_name(&self) -> &'static str {
        "TimedMutex"
    }
}

impl Lockable for TimedMutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock() }
    }

    #[inline]
    fn as_timed(&self) -> Option<&dyn TimedLockable> {
        Some(self)
    }
}

impl TimedLockable for TimedMutex {
    #[inline]
    fn try_lock_for(&self, timeout: Duration) -> bool {
        self.raw.try_lock_for(timeout)
    }

    #[inline]
    fn try_lock_until(&self, deadline: Instant) -> bool {
        self.raw.try_lock_until(deadline)
    }
}

impl std::fmt::Debug for TimedMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// An exclusive lock that the owning thread may acquire repeatedly. Each
/// acquisition needs its own release.
pub struct RecursiveMutex {
    raw: RawRecursive,
}

impl RecursiveMutex {
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawRecursive::INIT,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Returns `true` if the calling thread holds the lock.
    #[inline]
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.raw.is_owned_by_current_thread()
    }
}

impl Default for RecursiveMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for RecursiveMutex {
    fn type_name(&self) -> &'static str {
        "RecursiveMutex"
    }
}

impl Lockable for RecursiveMutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock() }
    }

    #[inline]
    fn is_recursive(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for RecursiveMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecursiveMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// A recursive lock supporting bounded waits.
pub struct RecursiveTimedMutex {
    raw: RawRecursive,
}

impl RecursiveTimedMutex {
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawRecursive::INIT,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    #[inline]
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.raw.is_owned_by_current_thread()
    }
}

impl Default for RecursiveTimedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for RecursiveTimedMutex {
    fn type_name(&self) -> &'static str {
        "RecursiveTimedMutex"
    }
}

impl Lockable for RecursiveTimedMutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock() }
    }

    #[inline]
    fn as_timed(&self) -> Option<&dyn TimedLockable> {
        Some(self)
    }

    #[inline]
    fn is_recursive(&self) -> bool {
        true
    }
}

impl TimedLockable for RecursiveTimedMutex {
    #[inline]
    fn try_lock_for(&self, timeout: Duration) -> bool {
        self.raw.try_lock_for(timeout)
    }

    #[inline]
    fn try_lock_until(&self, deadline: Instant) -> bool {
        self.raw.try_lock_until(deadline)
    }
}

impl std::fmt::Debug for RecursiveTimedMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecursiveTimedMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}
