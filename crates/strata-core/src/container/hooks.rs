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

use std::rc::Rc;

type Constructor<'h, T> = Rc<dyn Fn() -> T + 'h>;
type CopyConstructor<'h, T> = Rc<dyn Fn(&T) -> T + 'h>;
type Destructor<'h, T> = Rc<dyn Fn(T) + 'h>;

/// Per-element lifecycle hooks of a `Container`.
///
/// Every hook is optional. A missing constructor falls back to `Default`, a
/// missing copy-constructor to `Clone`, and a missing destructor to dropping
/// the value in place. Hooks are reference counted, so cloning the record
/// (as `Container::try_clone` does) shares them.
pub struct ElementHooks<'h, T> {
    constructor: Option<Constructor<'h, T>>,
    copy: Option<CopyConstructor<'h, T>>,
    destructor: Option<Destructor<'h, T>>,
}

impl<'h, T> Default for ElementHooks<'h, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, T> Clone for ElementHooks<'h, T> {
    fn clone(&self) -> Self {
        Self {
            constructor: self.constructor.clone(),
            copy: self.copy.clone(),
            destructor: self.destructor.clone(),
        }
    }
}

impl<'h, T> ElementHooks<'h, T> {
    /// A record without hooks.
    #[inline]
    pub fn new() -> Self {
        Self {
            constructor: None,
            copy: None,
            destructor: None,
        }
    }

    /// Sets the hook producing a fresh element.
    #[inline]
    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> T + 'h,
    {
        self.constructor = Some(Rc::new(constructor));
        self
    }

    /// Sets the hook producing a copy of an element.
    #[inline]
    pub fn with_copy<F>(mut self, copy: F) -> Self
    where
        F: Fn(&T) -> T + 'h,
    {
        self.copy = Some(Rc::new(copy));
        self
    }

    /// Sets the hook consuming an element that leaves the container.
    #[inline]
    pub fn with_destructor<F>(mut self, destructor: F) -> Self
    where
        F: Fn(T) + 'h,
    {
        self.destructor = Some(Rc::new(destructor));
        self
    }

    #[inline]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    #[inline]
    pub fn has_copy(&self) -> bool {
        self.copy.is_some()
    }

    #[inline]
    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    /// Produces a fresh element through the constructor hook or `Default`.
    #[inline]
    pub fn construct(&self) -> T
    where
        T: Default,
    {
        match &self.constructor {
            Some(constructor) => constructor(),
            None => T::default(),
        }
    }

    /// Copies `value` through the copy hook or `Clone`.
    #[inline]
    pub fn copy(&self, value: &T) -> T
    where
        T: Clone,
    {
        match &self.copy {
            Some(copy) => copy(value),
            None => value.clone(),
        }
    }

    /// Hands `value` to the destructor hook, or drops it.
    #[inline]
    pub fn destroy(&self, value: T) {
        match &self.destructor {
            Some(destructor) => destructor(value),
            None => drop(value),
        }
    }
}

impl<T> std::fmt::Debug for ElementHooks<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementHooks")
            .field("constructor", &self.has_constructor())
            .field("copy", &self.has_copy())
            .field("destructor", &self.has_destructor())
            .finish()
    }
}
