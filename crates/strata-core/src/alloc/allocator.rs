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

//! Allocator capability and the stock implementations.

use crate::dispatch::Describe;
use crate::error::{ContainerErrorCode, Error};
use crate::result::Result;
use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

/// The allocation capability consumed by containers and buffer guards.
///
/// Requests always carry a non-zero-sized `layout`; callers handle
/// zero-sized types without consulting the allocator.
pub trait Allocator: Describe {
    /// Allocates a block fitting `layout`.
    ///
    /// Returns `AllocationFailed` if the request cannot be satisfied.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// Returns a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` (or `reallocate`) on this
    /// allocator with exactly `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves a block into one fitting `new_layout`, preserving the first
    /// `min(old, new)` bytes. On failure the old block is left untouched.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live block of this allocator with `old_layout`, and
    /// both layouts must have the same alignment.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>> {
        debug_assert_eq!(
            old_layout.align(),
            new_layout.align(),
            "called `Allocator::reallocate` with layouts of different alignment"
        );

        let new_ptr = self.allocate(new_layout)?;
        let count = old_layout.size().min(new_layout.size());
        unsafe {
            std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), count);
            self.deallocate(ptr, old_layout);
        }
        Ok(new_ptr)
    }
}

impl std::fmt::Debug for dyn Allocator + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Allocator({})", self.type_name())
    }
}

/// Routes requests to the global allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

/// The process-wide `SystemAllocator`, used when no allocator is configured.
pub static SYSTEM_ALLOCATOR: SystemAllocator = SystemAllocator;

impl Describe for SystemAllocator {
    fn type_name(&self) -> &'static str {
        "SystemAllocator"
    }
}

impl Allocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert!(
            layout.size() > 0,
            "called `SystemAllocator::allocate` with a zero-sized layout"
        );

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { std::alloc::alloc(layout) };
        match NonNull::new(raw) {
            Some(ptr) => Ok(ptr),
            None => {
                log::debug!("SystemAllocator failed to allocate {} bytes", layout.size());
                Err(ContainerErrorCode::AllocationFailed.into())
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>> {
        debug_assert_eq!(old_layout.align(), new_layout.align());

        let raw = unsafe { std::alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) };
        NonNull::new(raw).ok_or_else(|| {
            log::debug!(
                "SystemAllocator failed to grow {} bytes to {} bytes",
                old_layout.size(),
                new_layout.size()
            );
            Error::from(ContainerErrorCode::AllocationFailed)
        })
    }
}

/// Allocation statistics of a `CountingAllocator`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationStats {
    /// Number of successful allocations (reallocations count once).
    pub allocations: usize,
    /// Number of deallocations (reallocations count once).
    pub deallocations: usize,
    /// Number of requests that were refused.
    pub failures: usize,
    /// Bytes currently handed out.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
}

impl std::fmt::Display for AllocationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AllocationStats(allocations: {}, deallocations: {}, failures: {}, live: {}B, peak: {}B)",
            self.allocations, self.deallocations, self.failures, self.live_bytes, self.peak_bytes
        )
    }
}

/// Wraps another allocator, counting requests and optionally enforcing a
/// ceiling on live bytes.
///
/// Statistics live in `Cell`s, so a `CountingAllocator` is meant to be shared
/// by reference within one thread.
#[derive(Debug)]
pub struct CountingAllocator<A = SystemAllocator> {
    inner: A,
    limit: Option<usize>,
    stats: Cell<AllocationStats>,
}

impl Default for CountingAllocator<SystemAllocator> {
    fn default() -> Self {
        Self::new(SystemAllocator)
    }
}

impl<A> CountingAllocator<A> {
    /// Counts requests passed to `inner`.
    #[inline]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            limit: None,
            stats: Cell::new(AllocationStats::default()),
        }
    }

    /// Refuses any request that would push live bytes above `limit_bytes`.
    #[inline]
    pub fn with_limit(inner: A, limit_bytes: usize) -> Self {
        Self {
            inner,
            limit: Some(limit_bytes),
            stats: Cell::new(AllocationStats::default()),
        }
    }

    /// A snapshot of the statistics.
    #[inline]
    pub fn stats(&self) -> AllocationStats {
        self.stats.get()
    }

    /// Bytes currently handed out.
    #[inline]
    pub fn live_bytes(&self) -> usize {
        self.stats.get().live_bytes
    }

    fn admits(&self, extra: usize) -> bool {
        match self.limit {
            Some(limit) => self.live_bytes().saturating_add(extra) <= limit,
            None => true,
        }
    }

    fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut AllocationStats),
    {
        let mut stats = self.stats.get();
        f(&mut stats);
        stats.peak_bytes = stats.peak_bytes.max(stats.live_bytes);
        self.stats.set(stats);
    }
}

impl<A> Describe for CountingAllocator<A> {
    fn type_name(&self) -> &'static str {
        "CountingAllocator"
    }
}

impl<A> Allocator for CountingAllocator<A>
where
    A: Allocator,
{
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>> {
        if !self.admits(layout.size()) {
            self.update(|s| s.failures += 1);
            log::debug!(
                "CountingAllocator refused {} bytes ({} live)",
                layout.size(),
                self.live_bytes()
            );
            return Err(ContainerErrorCode::AllocationFailed.into());
        }

        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.update(|s| {
                    s.allocations += 1;
                    s.live_bytes += layout.size();
                });
                Ok(ptr)
            }
            Err(e) => {
                self.update(|s| s.failures += 1);
                Err(e)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.update(|s| {
            s.deallocations += 1;
            s.live_bytes -= layout.size();
        });
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>> {
        let growth = new_layout.size().saturating_sub(old_layout.size());
        if !self.admits(growth) {
            self.update(|s| s.failures += 1);
            return Err(ContainerErrorCode::AllocationFailed.into());
        }

        match unsafe { self.inner.reallocate(ptr, old_layout, new_layout) } {
            Ok(new_ptr) => {
                self.update(|s| {
                    s.allocations += 1;
                    s.deallocations += 1;
                    s.live_bytes = s.live_bytes - old_layout.size() + new_layout.size();
                });
                Ok(new_ptr)
            }
            Err(e) => {
                self.update(|s| s.failures += 1);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_allocator_round_trip() {
        let layout = Layout::array::<u64>(4).unwrap();
        let alloc = SystemAllocator;
        let ptr = alloc.allocate(layout).unwrap();
        unsafe {
            ptr.as_ptr().cast::<u64>().write(42);
            assert_eq!(ptr.as_ptr().cast::<u64>().read(), 42);
            alloc.deallocate(ptr, layout);
        }
    }

    #[test]
    fn test_reallocate_preserves_prefix() {
        let alloc = CountingAllocator::default();
        let small = Layout::array::<u32>(2).unwrap();
        let large = Layout::array::<u32>(8).unwrap();

        let ptr = alloc.allocate(small).unwrap();
        unsafe {
            let p = ptr.as_ptr().cast::<u32>();
            p.write(7);
            p.add(1).write(9);

            let grown = alloc.reallocate(ptr, small, large).unwrap();
            let g = grown.as_ptr().cast::<u32>();
            assert_eq!(g.read(), 7);
            assert_eq!(g.add(1).read(), 9);
            assert_eq!(alloc.live_bytes(), large.size());
            alloc.deallocate(grown, large);
        }
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn test_counting_allocator_tracks_peak_and_balance() {
        let alloc = CountingAllocator::default();
        let layout = Layout::array::<u8>(64).unwrap();

        let a = alloc.allocate(layout).unwrap();
        let b = alloc.allocate(layout).unwrap();
        unsafe {
            alloc.deallocate(a, layout);
            alloc.deallocate(b, layout);
        }

        let stats = alloc.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.deallocations, 2);
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.peak_bytes, 128);
        assert!(format!("{}", stats).contains("peak: 128B"));
    }

    #[test]
    fn test_limit_refuses_with_allocation_failed() {
        let alloc = CountingAllocator::with_limit(SystemAllocator, 16);
        let layout = Layout::array::<u8>(32).unwrap();

        let e = alloc.allocate(layout).unwrap_err();
        assert_eq!(e.container_code(), Some(ContainerErrorCode::AllocationFailed));
        assert_eq!(alloc.stats().failures, 1);
        assert_eq!(alloc.stats().allocations, 0);
    }

    #[test]
    fn test_dyn_allocator_debug() {
        let alloc = SystemAllocator;
        let dyn_alloc: &dyn Allocator = &alloc;
        assert_eq!(format!("{:?}", dyn_alloc), "Allocator(SystemAllocator)");
    }
}
