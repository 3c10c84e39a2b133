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

//! # Reader-Writer Locks
//!
//! `SharedMutex` and `SharedTimedMutex` allow either one writer or any number
//! of readers. Both wrap `parking_lot::RawRwLock`; only the timed variant
//! exposes bounded waits.

use crate::lockable::{Lockable, SharedLockable, TimedLockable, TimedSharedLockable};
use parking_lot::lock_api::{RawRwLock as _, RawRwLockTimed as _};
use parking_lot::RawRwLock;
use std::time::{Duration, Instant};
use strata_core::dispatch::Describe;

/// A reader-writer lock without bounded waits.
pub struct SharedMutex {
    raw: RawRwLock,
}

impl SharedMutex {
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawRwLock::INIT,
        }
    }

    /// Returns `true` if a writer or at least one reader holds the lock.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for SharedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for SharedMutex {
    fn type_name(&self) -> &'static str {
        "SharedMutex"
    }
}

impl Lockable for SharedMutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock_exclusive();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock_exclusive()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock_exclusive() }
    }

    #[inline]
    fn as_shared(&self) -> Option<&dyn SharedLockable> {
        Some(self)
    }
}

impl SharedLockable for SharedMutex {
    #[inline]
    fn lock_shared(&self) {
        self.raw.lock_shared();
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        self.raw.try_lock_shared()
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        unsafe { self.raw.unlock_shared() }
    }
}

impl std::fmt::Debug for SharedMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

/// A reader-writer lock supporting bounded waits in both modes.
pub struct SharedTimedMutex {
    raw: RawRwLock,
}

impl SharedTimedMutex {
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawRwLock::INIT,
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }
}

impl Default for SharedTimedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Describe for SharedTimedMutex {
    fn type_name(&self) -> &'static str {
        "SharedTimedMutex"
    }
}

impl Lockable for SharedTimedMutex {
    #[inline]
    fn lock(&self) {
        self.raw.lock_exclusive();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.raw.try_lock_exclusive()
    }

    #[inline]
    unsafe fn unlock(&self) {
        unsafe { self.raw.unlock_exclusive() }
    }

    #[inline]
    fn as_timed(&self) -> Option<&dyn TimedLockable> {
        Some(self)
    }

    #[inline]
    fn as_shared(&self) -> Option<&dyn SharedLockable> {
        Some(self)
    }
}

impl TimedLockable for SharedTimedMutex {
    #[inline]
    fn try_lock_for(&self, timeout: Duration) -> bool {
        self.raw.try_lock_exclusive_for(timeout)
    }

    #[inline]
    fn try_lock_until(&self, deadline: Instant) -> bool {
        self.raw.try_lock_exclusive_until(deadline)
    }
}

impl SharedLockable for SharedTimedMutex {
    #[inline]
    fn lock_shared(&self) {
        self.raw.lock_shared();
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        self.raw.try_lock_shared()
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        unsafe { self.raw.unlock_shared() }
    }

    #[inline]
    fn as_timed_shared(&self) -> Option<&dyn TimedSharedLockable> {
        Some(self)
    }
}

impl TimedSharedLockable for SharedTimedMutex {
    #[inline]
    fn try_lock_shared_for(&self, timeout: Duration) -> bool {
        self.raw.try_lock_shared_for(timeout)
    }

    #[inline]
    fn try_lock_shared_until(&self, deadline: Instant) -> bool {
        self.raw.try_lock_shared_until(deadline)
    }
}

impl std::fmt::Debug for SharedTimedMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTimedMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}
