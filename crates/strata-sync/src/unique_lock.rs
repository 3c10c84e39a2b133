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

//! # Exclusive Lock Guard
//!
//! `UniqueLock` ties exclusive ownership of a `Lockable` to a scope. It is
//! created in one of several acquisition modes and releases the lock on drop
//! if, and only if, it owns it.
//!
//! Misuse is a programming defect and panics: locking a guard that already
//! owns its lock, unlocking one that does not, requesting a bounded wait on a
//! resource without that capability, or operating on a released guard.
//!
//! ## Usage
//!
//! ```rust
//! use strata_sync::{Mutex, UniqueLock};
//!
//! let mutex = Mutex::new();
//! {
//!     let guard = UniqueLock::new(&mutex);
//!     assert!(guard.owns_lock());
//!     assert!(mutex.is_locked());
//! }
//! assert!(!mutex.is_locked());
//! ```

use crate::lockable::Lockable;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use strata_core::dispatch::TraitRef;

/// Scoped exclusive ownership of a lock-like resource.
pub struct UniqueLock<'a> {
    mutex: Option<TraitRef<'a, dyn Lockable + 'a>>,
    owns: bool,
    // Locks are released on the thread that acquired them.
    _not_send: PhantomData<*const ()>,
}

impl<'a> UniqueLock<'a> {
    #[inline]
    fn with_state(mutex: &'a (dyn Lockable + 'a), owns: bool) -> Self {
        Self {
            mutex: Some(TraitRef::bind(mutex)),
            owns,
            _not_send: PhantomData,
        }
    }

    /// Acquires `mutex`, blocking until it is available.
    pub fn new(mutex: &'a (dyn Lockable + 'a)) -> Self {
        mutex.lock();
        log::trace!("UniqueLock acquired {}", mutex.type_name());
        Self::with_state(mutex, true)
    }

    /// Associates with `mutex` without acquiring it.
    #[inline]
    pub fn deferred(mutex: &'a (dyn Lockable + 'a)) -> Self {
        Self::with_state(mutex, false)
    }

    /// Tries to acquire `mutex` without blocking. Check `owns_lock` for the
    /// outcome.
    pub fn try_new(mutex: &'a (dyn Lockable + 'a)) -> Self {
        let owns = mutex.try_lock();
        log::trace!("UniqueLock try-acquire of {}: {}", mutex.type_name(), owns);
        Self::with_state(mutex, owns)
    }

    /// Takes over a lock the caller already holds.
    ///
    /// # Safety
    ///
    /// The calling context must hold `mutex` exclusively, and must not
    /// release it other than through the returned guard.
    #[inline]
    pub unsafe fn adopt(mutex: &'a (dyn Lockable + 'a)) -> Self {
        Self::with_state(mutex, true)
    }

    /// Tries to acquire `mutex`, giving up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support bounded waits.
    #[track_caller]
    pub fn try_for(mutex: &'a (dyn Lockable + 'a), timeout: Duration) -> Self {
        let mut guard = Self::deferred(mutex);
        guard.try_lock_for(timeout);
        guard
    }

    /// Tries to acquire `mutex`, giving up at `deadline`.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support bounded waits.
    #[track_caller]
    pub fn try_until(mutex: &'a (dyn Lockable + 'a), deadline: Instant) -> Self {
        let mut guard = Self::deferred(mutex);
        guard.try_lock_until(deadline);
        guard
    }

    /// Acquires the associated lock, blocking until it is available.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock or has been released.
    #[track_caller]
    pub fn lock(&mut self) {
        let mutex = self.acquirable("lock");
        mutex.invoke(|m| m.lock());
        log::trace!("UniqueLock acquired {}", mutex.type_name());
        self.owns = true;
    }

    /// Tries to acquire the associated lock without blocking.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock or has been released.
    #[track_caller]
    pub fn try_lock(&mut self) -> bool {
        let mutex = self.acquirable("try_lock");
        self.owns = mutex.invoke(|m| m.try_lock());
        self.owns
    }

    /// Tries to acquire the associated lock, giving up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock, has been released, or the
    /// lock does not support bounded waits.
    #[track_caller]
    pub fn try_lock_for(&mut self, timeout: Duration) -> bool {
        let mutex = self.acquirable("try_lock_for");
        let timed = mutex.require("try_lock_for", |m| m.as_timed());
        self.owns = timed.try_lock_for(timeout);
        log::trace!(
            "UniqueLock timed acquire of {} ({:?}): {}",
            mutex.type_name(),
            timeout,
            self.owns
        );
        self.owns
    }

    /// Tries to acquire the associated lock, giving up at `deadline`.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock, has been released, or the
    /// lock does not support bounded waits.
    #[track_caller]
    pub fn try_lock_until(&mut self, deadline: Instant) -> bool {
        let mutex = self.acquirable("try_lock_until");
        let timed = mutex.require("try_lock_until", |m| m.as_timed());
        self.owns = timed.try_lock_until(deadline);
        self.owns
    }

    /// Releases the associated lock before the guard goes out of scope.
    ///
    /// # Panics
    ///
    /// Panics if the guard does not own its lock.
    #[track_caller]
    pub fn unlock(&mut self) {
        let mutex = self.associated("unlock");
        if !self.owns {
            panic!("called `UniqueLock::unlock` on a guard that does not own its lock");
        }
        self.owns = false;
        // SAFETY: `owns` was set, so this guard holds the lock.
        unsafe { mutex.invoke(|m| m.unlock()) };
        log::trace!("UniqueLock released {}", mutex.type_name());
    }

    /// Returns `true` if the guard holds its lock.
    #[inline]
    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    /// The associated lock, or `None` after `release`.
    #[inline]
    pub fn mutex(&self) -> Option<TraitRef<'a, dyn Lockable + 'a>> {
        self.mutex
    }

    /// Disassociates the guard from its lock without unlocking it. If the
    /// guard owned the lock, the caller becomes responsible for releasing it.
    #[inline]
    pub fn release(&mut self) -> Option<TraitRef<'a, dyn Lockable + 'a>> {
        self.owns = false;
        self.mutex.take()
    }

    #[track_caller]
    fn associated(&self, operation: &str) -> TraitRef<'a, dyn Lockable + 'a> {
        match self.mutex {
            Some(mutex) => mutex,
            None => panic!(
                "called `UniqueLock::{}` on a guard without an associated lock",
                operation
            ),
        }
    }

    #[track_caller]
    fn acquirable(&self, operation: &str) -> TraitRef<'a, dyn Lockable + 'a> {
        let mutex = self.associated(operation);
        if self.owns {
            panic!(
                "called `UniqueLock::{}` on a guard that already owns {}",
                operation,
                mutex.type_name()
            );
        }
        mutex
    }
}

impl Drop for UniqueLock<'_> {
    fn drop(&mut self) {
        if let (true, Some(mutex)) = (self.owns, self.mutex) {
            self.owns = false;
            // SAFETY: `owns` was set, so this guard holds the lock.
            unsafe { mutex.invoke(|m| m.unlock()) };
            log::trace!("UniqueLock released {} on scope exit", mutex.type_name());
        }
    }
}

impl std::fmt::Debug for UniqueLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueLock")
            .field("mutex", &self.mutex)
            .field("owns", &self.owns)
            .finish()
    }
}
