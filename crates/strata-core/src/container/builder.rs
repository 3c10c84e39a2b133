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

use crate::alloc::{Allocator, SYSTEM_ALLOCATOR};
use crate::container::{Container, ElementHooks, DEFAULT_CAPACITY};
use crate::result::Result;

/// Builder for `Container`.
///
/// Defaults to the system allocator, `DEFAULT_CAPACITY` slots and no hooks.
pub struct ContainerBuilder<'a, T> {
    allocator: &'a dyn Allocator,
    capacity: usize,
    hooks: ElementHooks<'a, T>,
}

impl<'a, T> Default for ContainerBuilder<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> ContainerBuilder<'a, T> {
    /// Creates a new `ContainerBuilder` with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            allocator: &SYSTEM_ALLOCATOR,
            capacity: DEFAULT_CAPACITY,
            hooks: ElementHooks::new(),
        }
    }

    /// Sets the allocator the container draws its buffer from.
    #[inline]
    pub fn allocator(mut self, allocator: &'a dyn Allocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Sets the initial capacity. Zero defers allocation to the first insert.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the whole hook record.
    #[inline]
    pub fn hooks(mut self, hooks: ElementHooks<'a, T>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the constructor hook.
    #[inline]
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> T + 'a,
    {
        self.hooks = self.hooks.with_constructor(constructor);
        self
    }

    /// Sets the copy-constructor hook.
    #[inline]
    pub fn copy<F>(mut self, copy: F) -> Self
    where
        F: Fn(&T) -> T + 'a,
    {
        self.hooks = self.hooks.with_copy(copy);
        self
    }

    /// Sets the destructor hook.
    #[inline]
    pub fn destructor<F>(mut self, destructor: F) -> Self
    where
        F: Fn(T) + 'a,
    {
        self.hooks = self.hooks.with_destructor(destructor);
        self
    }

    /// Builds the container, allocating the initial buffer.
    #[inline]
    pub fn build(self) -> Result<Container<'a, T>> {
        Container::from_parts(self.allocator, self.capacity, self.hooks)
    }
}

impl<T> std::fmt::Debug for ContainerBuilder<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("allocator", &self.allocator.type_name())
            .field("capacity", &self.capacity)
            .field("hooks", &self.hooks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CountingAllocator;
    use crate::error::ContainerErrorCode;
    use std::cell::RefCell;

    #[test]
    fn test_builder_defaults() {
        let c: Container<'_, u32> = ContainerBuilder::new().build().unwrap();
        assert_eq!(c.capacity(), DEFAULT_CAPACITY);
        assert_eq!(c.len(), 0);
        assert_eq!(c.allocator().type_name(), "SystemAllocator");
    }

    #[test]
    fn test_builder_wires_allocator_capacity_and_hooks() {
        let destroyed = RefCell::new(Vec::new());
        let alloc = CountingAllocator::default();

        let mut c = ContainerBuilder::new()
            .allocator(&alloc)
            .capacity(3)
            .constructor(|| 7u64)
            .destructor(|v| destroyed.borrow_mut().push(v))
            .build()
            .unwrap();

        assert_eq!(c.capacity(), 3);
        assert_eq!(alloc.live_bytes(), 3 * std::mem::size_of::<u64>());

        c.push_default().unwrap();
        assert_eq!(c.as_slice(), &[7]);

        c.free();
        assert_eq!(*destroyed.borrow(), vec![7]);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn test_builder_zero_capacity_defers_allocation() {
        let alloc = CountingAllocator::default();
        let c: Container<'_, u8> = ContainerBuilder::new()
            .allocator(&alloc)
            .capacity(0)
            .build()
            .unwrap();
        assert_eq!(c.capacity(), 0);
        assert_eq!(alloc.stats().allocations, 0);
    }

    #[test]
    fn test_builder_reports_allocation_failure() {
        let alloc = CountingAllocator::with_limit(crate::alloc::SystemAllocator, 4);
        let result: Result<Container<'_, u64>> =
            ContainerBuilder::new().allocator(&alloc).capacity(2).build();
        assert_eq!(
            result.unwrap_err().container_code(),
            Some(ContainerErrorCode::AllocationFailed)
        );
    }
}
