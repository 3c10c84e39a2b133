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

use crate::alloc::{Allocator, ScopedBuffer};
use crate::container::{ElementHooks, DEFAULT_CAPACITY};
use crate::error::{ContainerErrorCode, Error, CONTAINER_CATEGORY};
use crate::iter::Position;
use crate::result::{OptionExt, Result};
use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// A contiguous, growable sequence of `T` whose buffer comes from a borrowed
/// `Allocator` and whose elements pass through `ElementHooks` when they are
/// constructed, copied or destroyed.
///
/// Slots `[0, len)` are initialised, slots `[len, capacity)` are not. The
/// buffer grows from zero to `DEFAULT_CAPACITY` and doubles afterwards.
/// Zero-sized element types never touch the allocator and report a capacity
/// of `usize::MAX`.
///
/// Every operation that can fail returns a `Result` and leaves the container
/// unchanged on failure.
pub struct Container<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    allocator: &'a dyn Allocator,
    hooks: ElementHooks<'a, T>,
    _owns: PhantomData<T>,
}

impl<'a, T> Container<'a, T> {
    const IS_ZST: bool = std::mem::size_of::<T>() == 0;

    /// Creates an empty container with `DEFAULT_CAPACITY` slots.
    #[inline]
    pub fn new(allocator: &'a dyn Allocator) -> Result<Self> {
        Self::with_capacity(DEFAULT_CAPACITY, allocator)
    }

    /// Creates an empty container with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize, allocator: &'a dyn Allocator) -> Result<Self> {
        Self::from_parts(allocator, capacity, ElementHooks::new())
    }

    pub(crate) fn from_parts(
        allocator: &'a dyn Allocator,
        capacity: usize,
        hooks: ElementHooks<'a, T>,
    ) -> Result<Self> {
        let mut container = Self {
            ptr: NonNull::dangling(),
            len: 0,
            capacity: if Self::IS_ZST { usize::MAX } else { 0 },
            allocator,
            hooks,
            _owns: PhantomData,
        };
        if capacity > 0 {
            container.set_capacity(capacity)?;
        }
        Ok(container)
    }

    /// Returns the number of live elements.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of slots in the buffer.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the next insert has to grow the buffer.
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// The largest number of elements a buffer can hold.
    #[inline]
    pub fn max_size(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            isize::MAX as usize / std::mem::size_of::<T>()
        }
    }

    /// The allocator backing this container.
    #[inline]
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.allocator
    }

    /// The lifecycle hooks of this container.
    #[inline]
    pub fn hooks(&self) -> &ElementHooks<'a, T> {
        &self.hooks
    }

    /// Returns the live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `ptr` is non-null, aligned and the first `len` slots are
        // initialised.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: see `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the element at `index`, or `IndexOutOfBounds`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        self.get(index).ok_or_code(
            ContainerErrorCode::IndexOutOfBounds as i64,
            &CONTAINER_CATEGORY,
        )
    }

    /// Returns the element at `index` mutably, or `IndexOutOfBounds`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        self.get_mut(index).ok_or_code(
            ContainerErrorCode::IndexOutOfBounds as i64,
            &CONTAINER_CATEGORY,
        )
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. Only debug builds verify this.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(
            index < self.len,
            "called `Container::get_unchecked` with index out of bounds: the len is {} but the index is {}",
            self.len,
            index
        );
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns a position at the first element.
    #[inline]
    pub fn positions(&self) -> Position<'_, Self> {
        Position::begin(self)
    }

    /// Appends `value`, growing the buffer if needed. No hook runs; the value
    /// is already constructed.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.grow_for(1)?;
        // SAFETY: `len < capacity` after growing.
        unsafe { self.write_slot(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Appends a copy of `value` produced by the copy hook (or `Clone`).
    pub fn push_copy(&mut self, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.grow_for(1)?;
        let copy = self.hooks.copy(value);
        unsafe { self.write_slot(self.len, copy) };
        self.len += 1;
        Ok(())
    }

    /// Appends an element produced by the constructor hook (or `Default`).
    pub fn push_default(&mut self) -> Result<()>
    where
        T: Default,
    {
        self.grow_for(1)?;
        let value = self.hooks.construct();
        unsafe { self.write_slot(self.len, value) };
        self.len += 1;
        Ok(())
    }

    /// Appends copies of every element of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.grow_for(values.len())?;
        for value in values {
            let copy = self.hooks.copy(value);
            unsafe { self.write_slot(self.len, copy) };
            self.len += 1;
        }
        Ok(())
    }

    /// Inserts `value` at `index`, shifting later elements up by one.
    ///
    /// `index == len()` appends. Returns `IndexOutOfBounds` if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(ContainerErrorCode::IndexOutOfBounds.into());
        }

        self.grow_for(1)?;
        // SAFETY: `index <= len < capacity`; the tail is moved up by one slot
        // before the hole is written.
        unsafe {
            let slot = self.ptr.as_ptr().add(index);
            std::ptr::copy(slot, slot.add(1), self.len - index);
            slot.write(value);
        }
        self.len += 1;
        Ok(())
    }

    /// Inserts a copy of `value`, produced by the copy hook (or `Clone`), at
    /// `index`.
    ///
    /// Returns `IndexOutOfBounds` if `index > len()`; the hook does not run
    /// in that case.
    pub fn insert_copy(&mut self, index: usize, value: &T) -> Result<()>
    where
        T: Clone,
    {
        if index > self.len {
            return Err(ContainerErrorCode::IndexOutOfBounds.into());
        }
        self.grow_for(1)?;
        let copy = self.hooks.copy(value);
        self.insert(index, copy)
    }

    /// Destroys the element at `index` and closes the gap.
    ///
    /// Returns `IndexOutOfBounds` if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(ContainerErrorCode::IndexOutOfBounds.into());
        }

        // SAFETY: `index < len`; the slot is read out before the tail is
        // moved down over it.
        let value = unsafe {
            let slot = self.ptr.as_ptr().add(index);
            let value = slot.read();
            std::ptr::copy(slot.add(1), slot, self.len - index - 1);
            value
        };
        self.len -= 1;
        self.hooks.destroy(value);
        Ok(())
    }

    /// Destroys `count` elements starting at `index`, in ascending order, and
    /// closes the gap.
    ///
    /// Returns `InvalidRange` if `index + count` exceeds `len()`.
    pub fn remove_n(&mut self, index: usize, count: usize) -> Result<()> {
        let end = match index.checked_add(count) {
            Some(end) if end <= self.len => end,
            _ => return Err(ContainerErrorCode::InvalidRange.into()),
        };
        if count == 0 {
            return Ok(());
        }

        let old_len = self.len;
        // A panicking hook leaks the tail instead of exposing destroyed slots.
        self.len = index;
        for i in index..end {
            let value = unsafe { self.read_slot(i) };
            self.hooks.destroy(value);
        }
        // SAFETY: `[end, old_len)` is initialised and moves into `[index, ..)`.
        unsafe {
            let base = self.ptr.as_ptr();
            std::ptr::copy(base.add(end), base.add(index), old_len - end);
        }
        self.len = old_len - count;
        Ok(())
    }

    /// Moves the last element out. No hook runs; the caller owns the value.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was initialised and is now
        // outside the live range.
        Some(unsafe { self.read_slot(self.len) })
    }

    /// Destroys elements beyond `len` in ascending order. Does nothing if
    /// `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        let old_len = self.len;
        self.len = len;
        for i in len..old_len {
            let value = unsafe { self.read_slot(i) };
            self.hooks.destroy(value);
        }
    }

    /// Destroys every element in ascending order. Capacity is retained.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes to `len` elements: new slots come from the constructor hook
    /// (or `Default`), removed slots go through the destructor hook.
    pub fn resize(&mut self, len: usize) -> Result<()>
    where
        T: Default,
    {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }

        self.grow_for(len - self.len)?;
        while self.len < len {
            let value = self.hooks.construct();
            unsafe { self.write_slot(self.len, value) };
            self.len += 1;
        }
        Ok(())
    }

    /// Ensures room for at least `additional` more elements, following the
    /// doubling growth policy.
    #[inline]
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.grow_for(additional)
    }

    /// Ensures room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) -> Result<()> {
        let required = self.required_capacity(additional)?;
        if required <= self.capacity {
            return Ok(());
        }
        self.set_capacity(required)
    }

    /// Reallocates the buffer to hold exactly `len()` elements. An empty
    /// container releases its buffer.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if Self::IS_ZST || self.len == self.capacity {
            return Ok(());
        }

        log::debug!(
            "Container<{}> shrinking from {} to {} slots",
            std::any::type_name::<T>(),
            self.capacity,
            self.len
        );
        self.set_capacity(self.len)
    }

    /// Destroys every element in ascending order and returns the buffer to
    /// the allocator. Dropping the container does the same.
    #[inline]
    pub fn free(self) {
        drop(self)
    }

    /// Creates an independent container on the same allocator, copying each
    /// element through the copy hook (or `Clone`). Hooks are shared.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut clone = Self::from_parts(self.allocator, self.len, self.hooks.clone())?;
        for value in self.iter() {
            let copy = self.hooks.copy(value);
            unsafe { clone.write_slot(clone.len, copy) };
            clone.len += 1;
        }
        Ok(clone)
    }

    #[inline(always)]
    unsafe fn write_slot(&mut self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        unsafe { self.ptr.as_ptr().add(index).write(value) }
    }

    #[inline(always)]
    unsafe fn read_slot(&self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        unsafe { self.ptr.as_ptr().add(index).read() }
    }

    #[inline]
    fn required_capacity(&self, additional: usize) -> Result<usize> {
        self.len
            .checked_add(additional)
            .ok_or_else(|| Error::from(ContainerErrorCode::CapacityOverflow))
    }

    fn grow_for(&mut self, additional: usize) -> Result<()> {
        let required = self.required_capacity(additional)?;
        if required <= self.capacity {
            return Ok(());
        }

        let grown = if self.capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            self.capacity.saturating_mul(2)
        };
        let new_capacity = grown.max(required);

        log::debug!(
            "Container<{}> growing from {} to {} slots",
            std::any::type_name::<T>(),
            self.capacity,
            new_capacity
        );
        self.set_capacity(new_capacity)
    }

    /// Moves the live elements into a buffer of exactly `new_capacity` slots.
    /// On failure the current buffer is untouched.
    fn set_capacity(&mut self, new_capacity: usize) -> Result<()> {
        debug_assert!(new_capacity >= self.len);
        if Self::IS_ZST || new_capacity == self.capacity {
            return Ok(());
        }
        if new_capacity == 0 {
            self.release_buffer();
            return Ok(());
        }

        let layout = Layout::array::<T>(new_capacity)
            .map_err(|_| Error::from(ContainerErrorCode::CapacityOverflow))?;
        let buffer = ScopedBuffer::allocate(self.allocator, layout)?;

        // SAFETY: both buffers hold at least `len` slots and do not overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), buffer.cast::<T>().as_ptr(), self.len);
        }
        self.release_buffer();

        let (ptr, _) = buffer.into_raw();
        self.ptr = ptr.cast();
        self.capacity = new_capacity;
        Ok(())
    }

    /// Returns the buffer to the allocator without touching its contents.
    fn release_buffer(&mut self) {
        if !Self::IS_ZST && self.capacity > 0 {
            // SAFETY: this layout was validated when the buffer was allocated.
            let layout = unsafe {
                Layout::from_size_align_unchecked(
                    std::mem::size_of::<T>() * self.capacity,
                    std::mem::align_of::<T>(),
                )
            };
            unsafe { self.allocator.deallocate(self.ptr.cast(), layout) };
            self.ptr = NonNull::dangling();
            self.capacity = 0;
        }
    }
}

impl<T> Drop for Container<'_, T> {
    fn drop(&mut self) {
        self.truncate(0);
        self.release_buffer();
    }
}

impl<T> std::ops::Index<usize> for Container<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<T> std::ops::IndexMut<usize> for Container<'_, T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> AsRef<[T]> for Container<'_, T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<'c, T> IntoIterator for &'c Container<'_, T> {
    type Item = &'c T;
    type IntoIter = std::slice::Iter<'c, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> PartialEq for Container<'_, T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> std::fmt::Debug for Container<'_, T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> std::fmt::Display for Container<'_, T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("]")
    }
}
