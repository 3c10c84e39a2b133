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

use crate::alloc::Allocator;
use crate::result::Result;
use std::alloc::Layout;
use std::ptr::NonNull;

/// An allocator buffer that is returned to its allocator when the guard goes
/// out of scope.
///
/// The guard never constructs or drops values in the buffer; it only owns the
/// memory. Ownership of the block can be taken back with `into_raw`, after
/// which the guard does nothing on drop.
pub struct ScopedBuffer<'a> {
    ptr: NonNull<u8>,
    layout: Layout,
    allocator: &'a dyn Allocator,
}

impl<'a> ScopedBuffer<'a> {
    /// Allocates a block fitting `layout` from `allocator`.
    ///
    /// # Panics
    ///
    /// Panics if `layout` is zero-sized.
    #[inline]
    pub fn allocate(allocator: &'a dyn Allocator, layout: Layout) -> Result<Self> {
        assert!(
            layout.size() > 0,
            "called `ScopedBuffer::allocate` with a zero-sized layout"
        );

        let ptr = allocator.allocate(layout)?;
        Ok(Self {
            ptr,
            layout,
            allocator,
        })
    }

    /// Returns the start of the block.
    #[inline(always)]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Returns the start of the block as a `T` pointer.
    #[inline(always)]
    pub fn cast<T>(&self) -> NonNull<T> {
        debug_assert!(self.layout.align() >= std::mem::align_of::<T>());
        self.ptr.cast()
    }

    /// Returns the layout the block was allocated with.
    #[inline(always)]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the allocator the block belongs to.
    #[inline(always)]
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.allocator
    }

    /// Releases ownership of the block without deallocating it.
    #[inline]
    pub fn into_raw(self) -> (NonNull<u8>, Layout) {
        let parts = (self.ptr, self.layout);
        std::mem::forget(self);
        parts
    }
}

impl Drop for ScopedBuffer<'_> {
    fn drop(&mut self) {
        // SAFETY: the block was allocated from `allocator` with `layout` and
        // ownership has not been released.
        unsafe { self.allocator.deallocate(self.ptr, self.layout) }
    }
}

impl std::fmt::Debug for ScopedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedBuffer")
            .field("ptr", &self.ptr)
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .field("allocator", &self.allocator.type_name())
            .finish()
    }
}
