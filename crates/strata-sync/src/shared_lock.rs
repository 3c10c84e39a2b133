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

//! # Shared Lock Guard
//!
//! `SharedLock` is the reader counterpart of `UniqueLock`: it holds shared
//! access to a resource and releases it on drop if it owns it. The resource
//! must provide the shared capability; binding a guard to one that does not
//! panics at construction.

use crate::lockable::{Lockable, SharedLockable};
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use strata_core::dispatch::TraitRef;

/// Scoped shared ownership of a lock-like resource.
pub struct SharedLock<'a> {
    mutex: Option<TraitRef<'a, dyn Lockable + 'a>>,
    owns: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a> SharedLock<'a> {
    #[inline]
    #[track_caller]
    fn with_state<F>(mutex: &'a (dyn Lockable + 'a), operation: &str, owns: F) -> Self
    where
        F: FnOnce(&'a dyn SharedLockable) -> bool,
    {
        let handle = TraitRef::bind(mutex);
        let shared = handle.require(operation, |m| m.as_shared());
        Self {
            mutex: Some(handle),
            owns: owns(shared),
            _not_send: PhantomData,
        }
    }

    /// Acquires shared access to `mutex`, blocking until no writer holds it.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support shared acquisition.
    #[track_caller]
    pub fn new(mutex: &'a (dyn Lockable + 'a)) -> Self {
        let guard = Self::with_state(mutex, "lock_shared", |s| {
            s.lock_shared();
            true
        });
        log::trace!("SharedLock acquired {}", mutex.type_name());
        guard
    }

    /// Associates with `mutex` without acquiring it.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support shared acquisition.
    #[track_caller]
    pub fn deferred(mutex: &'a (dyn Lockable + 'a)) -> Self {
        Self::with_state(mutex, "lock_shared", |_| false)
    }

    /// Tries to acquire shared access without blocking.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support shared acquisition.
    #[track_caller]
    pub fn try_new(mutex: &'a (dyn Lockable + 'a)) -> Self {
        let guard = Self::with_state(mutex, "try_lock_shared", |s| s.try_lock_shared());
        log::trace!("SharedLock try-acquire of {}: {}", mutex.type_name(), guard.owns);
        guard
    }

    /// Takes over shared access the caller already holds.
    ///
    /// # Safety
    ///
    /// The calling context must hold shared access to `mutex`, and must not
    /// release it other than through the returned guard.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support shared acquisition.
    #[track_caller]
    pub unsafe fn adopt(mutex: &'a (dyn Lockable + 'a)) -> Self {
        Self::with_state(mutex, "lock_shared", |_| true)
    }

    /// Tries to acquire shared access, giving up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support bounded shared waits.
    #[track_caller]
    pub fn try_for(mutex: &'a (dyn Lockable + 'a), timeout: Duration) -> Self {
        let mut guard = Self::deferred(mutex);
        guard.try_lock_for(timeout);
        guard
    }

    /// Tries to acquire shared access, giving up at `deadline`.
    ///
    /// # Panics
    ///
    /// Panics if `mutex` does not support bounded shared waits.
    #[track_caller]
    pub fn try_until(mutex: &'a (dyn Lockable + 'a), deadline: Instant) -> Self {
        let mut guard = Self::deferred(mutex);
        guard.try_lock_until(deadline);
        guard
    }

    /// Acquires shared access, blocking until no writer holds the lock.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock or has been released.
    #[track_caller]
    pub fn lock(&mut self) {
        let shared = self.acquirable("lock");
        shared.lock_shared();
        log::trace!("SharedLock acquired {}", self.lock_name());
        self.owns = true;
    }

    /// Tries to acquire shared access without blocking.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock or has been released.
    #[track_caller]
    pub fn try_lock(&mut self) -> bool {
        let shared = self.acquirable("try_lock");
        self.owns = shared.try_lock_shared();
        log::trace!("SharedLock try-acquire of {}: {}", self.lock_name(), self.owns);
        self.owns
    }

    /// Tries to acquire shared access, giving up after `timeout`.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock, has been released, or the
    /// lock does not support bounded shared waits.
    #[track_caller]
    pub fn try_lock_for(&mut self, timeout: Duration) -> bool {
        let shared = self.acquirable("try_lock_for");
        let timed = self.timed_shared("try_lock_shared_for", shared);
        self.owns = timed.try_lock_shared_for(timeout);
        log::trace!(
            "SharedLock timed acquire of {} ({:?}): {}",
            self.lock_name(),
            timeout,
            self.owns
        );
        self.owns
    }

    /// Tries to acquire shared access, giving up at `deadline`.
    ///
    /// # Panics
    ///
    /// Panics if the guard already owns its lock, has been released, or the
    /// lock does not support bounded shared waits.
    #[track_caller]
    pub fn try_lock_until(&mut self, deadline: Instant) -> bool {
        let shared = self.acquirable("try_lock_until");
        let timed = self.timed_shared("try_lock_shared_until", shared);
        self.owns = timed.try_lock_shared_until(deadline);
        self.owns
    }

    /// Releases shared access before the guard goes out of scope.
    ///
    /// # Panics
    ///
    /// Panics if the guard does not own its lock.
    #[track_caller]
    pub fn unlock(&mut self) {
        let shared = self.shared("unlock");
        if !self.owns {
            panic!("called `SharedLock::unlock` on a guard that does not own its lock");
        }
        self.owns = false;
        // SAFETY: `owns` was set, so this guard holds shared access.
        unsafe { shared.unlock_shared() };
        log::trace!("SharedLock released {}", self.lock_name());
    }

    #[inline]
    pub fn owns_lock(&self) -> bool {
        self.owns
    }

    /// The associated lock, or `None` after `release`.
    #[inline]
    pub fn mutex(&self) -> Option<TraitRef<'a, dyn Lockable + 'a>> {
        self.mutex
    }

    /// Disassociates the guard from its lock without unlocking it.
    #[inline]
    pub fn release(&mut self) -> Option<TraitRef<'a, dyn Lockable + 'a>> {
        self.owns = false;
        self.mutex.take()
    }

    #[inline]
    fn lock_name(&self) -> &'static str {
        self.mutex.map_or("<released>", |m| m.type_name())
    }

    #[track_caller]
    fn shared(&self, operation: &str) -> &'a dyn SharedLockable {
        match self.mutex {
            Some(mutex) => mutex.require("lock_shared", |m| m.as_shared()),
            None => panic!(
                "called `SharedLock::{}` on a guard without an associated lock",
                operation
            ),
        }
    }

    #[track_caller]
    fn acquirable(&self, operation: &str) -> &'a dyn SharedLockable {
        let shared = self.shared(operation);
        if self.owns {
            panic!(
                "called `SharedLock::{}` on a guard that already owns its lock",
                operation
            );
        }
        shared
    }

    #[track_caller]
    fn timed_shared(
        &self,
        operation: &str,
        shared: &'a dyn SharedLockable,
    ) -> &'a dyn crate::lockable::TimedSharedLockable {
        match shared.as_timed_shared() {
            Some(timed) => timed,
            None => {
                strata_core::dispatch::missing_capability(self.lock_name(), operation)
            }
        }
    }
}

impl Drop for SharedLock<'_> {
    fn drop(&mut self) {
        if !self.owns {
            return;
        }
        if let Some(shared) = self.mutex.and_then(|m| m.get().as_shared()) {
            self.owns = false;
            // SAFETY: `owns` was set, so this guard holds shared access.
            unsafe { shared.unlock_shared() };
            log::trace!("SharedLock released {} on scope exit", self.lock_name());
        }
    }
}

impl std::fmt::Debug for SharedLock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLock")
            .field("mutex", &self.mutex)
            .field("owns", &self.owns)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutex::Mutex;
    use crate::shared_mutex::{SharedMutex, SharedTimedMutex};
    use crate::unique_lock::UniqueLock;
    use std::cell::RefCell;

    // Records guard trace lines per thread so parallel tests do not mix.
    struct GuardTraces;

    thread_local! {
        static TRACES: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    impl log::Log for GuardTraces {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Trace
        }

        fn log(&self, record: &log::Record<'_>) {
            let line = record.args().to_string();
            if line.starts_with("SharedLock") {
                TRACES.with(|t| t.borrow_mut().push(line));
            }
        }

        fn flush(&self) {}
    }

    static GUARD_TRACES: GuardTraces = GuardTraces;

    fn take_traces() -> Vec<String> {
        let _ = log::set_logger(&GUARD_TRACES);
        log::set_max_level(log::LevelFilter::Trace);
        TRACES.with(|t| std::mem::take(&mut *t.borrow_mut()))
    }

    #[test]
    fn test_every_acquire_and_release_is_traced() {
        let m = SharedMutex::new();
        take_traces();

        let mut guard = SharedLock::deferred(&m);
        guard.lock();
        guard.unlock();
        assert!(guard.try_lock());
        drop(guard);

        assert_eq!(
            take_traces(),
            vec![
                "SharedLock acquired SharedMutex".to_string(),
                "SharedLock released SharedMutex".to_string(),
                "SharedLock try-acquire of SharedMutex: true".to_string(),
                "SharedLock released SharedMutex on scope exit".to_string(),
            ]
        );
    }

    #[test]
    fn test_readers_coexist() {
        let m = SharedMutex::new();
        let a = SharedLock::new(&m);
        let b = SharedLock::try_new(&m);
        assert!(a.owns_lock() && b.owns_lock());

        let writer = UniqueLock::try_new(&m);
        assert!(!writer.owns_lock());
        drop(writer);

        drop(a);
        drop(b);
        assert!(!m.is_locked());
    }

    #[test]
    fn test_try_new_fails_under_writer() {
        let m = SharedMutex::new();
        let writer = UniqueLock::new(&m);
        let reader = SharedLock::try_new(&m);
        assert!(!reader.owns_lock());
        drop(reader);
        assert!(writer.owns_lock());
    }

    #[test]
    fn test_deferred_lock_unlock() {
        let m = SharedMutex::new();
        let mut guard = SharedLock::deferred(&m);
        assert!(!m.is_locked());
        guard.lock();
        assert!(m.is_locked());
        guard.unlock();
        assert!(!m.is_locked());
        assert!(guard.try_lock());
    }

    #[test]
    fn test_adopt() {
        let m = SharedMutex::new();
        m.lock_shared();
        drop(unsafe { SharedLock::adopt(&m) });
        assert!(!m.is_locked());
    }

    #[test]
    fn test_timed_shared_modes() {
        let m = SharedTimedMutex::new();
        let writer = UniqueLock::new(&m);
        let reader = SharedLock::try_for(&m, Duration::from_millis(5));
        assert!(!reader.owns_lock());
        drop(reader);
        drop(writer);

        let reader = SharedLock::try_until(&m, Instant::now() + Duration::from_millis(5));
        assert!(reader.owns_lock());
    }

    #[test]
    fn test_release_leaves_shared_access_held() {
        let m = SharedMutex::new();
        let mut guard = SharedLock::new(&m);
        assert!(guard.release().is_some());
        drop(guard);
        assert!(m.is_locked());
        unsafe { m.unlock_shared() };
    }

    #[test]
    #[should_panic(expected = "called `lock_shared` on `Mutex`, which does not provide that capability")]
    fn test_exclusive_only_resource_is_fatal() {
        let m = Mutex::new();
        let _ = SharedLock::new(&m);
    }

    #[test]
    #[should_panic(expected = "called `try_lock_shared_for` on `SharedMutex`, which does not provide that capability")]
    fn test_timed_request_without_capability_is_fatal() {
        let m = SharedMutex::new();
        let _ = SharedLock::try_for(&m, Duration::from_millis(1));
    }

    #[test]
    #[should_panic(expected = "called `SharedLock::lock` on a guard that already owns its lock")]
    fn test_double_lock_is_fatal() {
        let m = SharedMutex::new();
        let mut guard = SharedLock::new(&m);
        guard.lock();
    }

    #[test]
    #[should_panic(expected = "called `SharedLock::unlock` on a guard that does not own its lock")]
    fn test_unlock_without_ownership_is_fatal() {
        let m = SharedMutex::new();
        let mut guard = SharedLock::deferred(&m);
        guard.unlock();
    }
}
