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

//! # Lock Capabilities
//!
//! A lock-like resource is anything implementing `Lockable`. Bounded waits
//! and shared (reader) acquisition are optional capabilities, reached
//! through `as_timed`, `as_shared` and `SharedLockable::as_timed_shared`.
//! Types that do not provide a capability keep the default `None`; guards
//! treat a request for a missing capability as a programming defect.

use std::time::{Duration, Instant};
use strata_core::dispatch::{CapabilitySet, Describe};

/// Exclusive acquisition.
pub trait Lockable: Describe {
    /// Blocks until the lock is acquired.
    fn lock(&self);

    /// Acquires the lock if it is free. Never blocks.
    fn try_lock(&self) -> bool;

    /// Releases the lock.
    ///
    /// # Safety
    ///
    /// The calling context must hold the lock, acquired through `lock`,
    /// `try_lock` or a timed variant of this resource.
    unsafe fn unlock(&self);

    /// Bounded-wait acquisition, if supported.
    #[inline]
    fn as_timed(&self) -> Option<&dyn TimedLockable> {
        None
    }

    /// Shared acquisition, if supported.
    #[inline]
    fn as_shared(&self) -> Option<&dyn SharedLockable> {
        None
    }

    /// Returns `true` if the owning thread may acquire the lock again.
    #[inline]
    fn is_recursive(&self) -> bool {
        false
    }

    /// The optional capabilities this resource provides.
    fn capabilities(&self) -> CapabilitySet {
        let mut set = CapabilitySet::NONE;
        if self.as_timed().is_some() {
            set.insert(CapabilitySet::TIMED);
        }
        if let Some(shared) = self.as_shared() {
            set.insert(CapabilitySet::SHARED);
            if shared.as_timed_shared().is_some() {
                set.insert(CapabilitySet::SHARED_TIMED);
            }
        }
        if self.is_recursive() {
            set.insert(CapabilitySet::RECURSIVE);
        }
        set
    }
}

/// Exclusive acquisition with a bounded wait.
pub trait TimedLockable {
    /// Tries to acquire the lock, giving up after `timeout`.
    fn try_lock_for(&self, timeout: Duration) -> bool;

    /// Tries to acquire the lock, giving up at `deadline`.
    fn try_lock_until(&self, deadline: Instant) -> bool;
}

/// Shared (reader) acquisition.
pub trait SharedLockable {
    /// Blocks until shared access is acquired.
    fn lock_shared(&self);

    /// Acquires shared access if no writer holds the lock. Never blocks.
    fn try_lock_shared(&self) -> bool;

    /// Releases shared access.
    ///
    /// # Safety
    ///
    /// The calling context must hold shared access to this resource.
    unsafe fn unlock_shared(&self);

    /// Bounded-wait shared acquisition, if supported.
    #[inline]
    fn as_timed_shared(&self) -> Option<&dyn TimedSharedLockable> {
        None
    }
}

/// Shared acquisition with a bounded wait.
pub trait TimedSharedLockable {
    fn try_lock_shared_for(&self, timeout: Duration) -> bool;

    fn try_lock_shared_until(&self, deadline: Instant) -> bool;
}
