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

//! # Capability Dispatch
//!
//! Interface-style polymorphism over unrelated concrete types. A capability is
//! a trait; its descriptor is the compile-time trait implementation of a
//! concrete type, so it is immutable and lives for the whole program. A
//! `TraitRef<'a, D>` binds a borrowed handle to that descriptor (usually
//! `D = dyn Trait`) and never owns the handle.
//!
//! Some operations of a capability are optional. They are exposed by the
//! capability trait as accessors returning `Option<&dyn SubCapability>`; a
//! type that does not provide them returns `None`. Invoking an optional
//! operation that a type does not provide is a programming defect and aborts
//! through [`missing_capability`]; it is never reported as a recoverable
//! error.
//!
//! ## Usage
//!
//! ```rust
//! use strata_core::dispatch::{Describe, TraitRef};
//!
//! trait Greeter: Describe {
//!     fn greet(&self) -> String;
//!     fn shout(&self) -> Option<&dyn Shouter> {
//!         None
//!     }
//! }
//!
//! trait Shouter {
//!     fn shout(&self) -> String;
//! }
//!
//! struct Quiet;
//!
//! impl Describe for Quiet {
//!     fn type_name(&self) -> &'static str {
//!         "Quiet"
//!     }
//! }
//!
//! impl Greeter for Quiet {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let quiet = Quiet;
//! let greeter: TraitRef<'_, dyn Greeter> = TraitRef::bind(&quiet);
//! assert_eq!(greeter.invoke(|g| g.greet()), "hello");
//! assert!(greeter.get().shout().is_none());
//! ```

/// Gives a concrete type a stable, human-readable name for diagnostics.
pub trait Describe {
    /// The name of the concrete type behind a handle.
    fn type_name(&self) -> &'static str;
}

/// Aborts with a diagnostic naming the operation and the type lacking it.
///
/// # Panics
///
/// Always.
#[cold]
#[inline(never)]
#[track_caller]
pub fn missing_capability(type_name: &str, operation: &str) -> ! {
    panic!(
        "called `{}` on `{}`, which does not provide that capability",
        operation, type_name
    )
}

/// A borrowed handle bound to its capability descriptor.
///
/// `TraitRef` is `Copy`; copies refer to the same handle. The lifetime `'a`
/// ties the reference to the handle, so a `TraitRef` cannot outlive it.
#[repr(transparent)]
pub struct TraitRef<'a, D: ?Sized> {
    handle: &'a D,
}

impl<'a, D: ?Sized> Clone for TraitRef<'a, D> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: ?Sized> Copy for TraitRef<'a, D> {}

impl<'a, D: ?Sized> TraitRef<'a, D> {
    /// Binds `handle` to the capability table of its concrete type.
    #[inline(always)]
    pub const fn bind(handle: &'a D) -> Self {
        Self { handle }
    }

    /// Returns the bound handle.
    #[inline(always)]
    pub const fn get(&self) -> &'a D {
        self.handle
    }

    /// Dispatches `operation` through the bound descriptor.
    #[inline(always)]
    pub fn invoke<R, F>(&self, operation: F) -> R
    where
        F: FnOnce(&'a D) -> R,
    {
        operation(self.handle)
    }

    /// Returns `true` if both references point at the same handle.
    #[inline]
    pub fn same_handle(&self, other: &TraitRef<'_, D>) -> bool {
        std::ptr::addr_eq(self.handle as *const D, other.handle as *const D)
    }
}

impl<'a, D> TraitRef<'a, D>
where
    D: ?Sized + Describe,
{
    /// Resolves an optional capability of the bound handle.
    ///
    /// # Panics
    ///
    /// Panics through [`missing_capability`] if `select` returns `None`.
    #[inline]
    #[track_caller]
    pub fn require<C, F>(&self, operation: &str, select: F) -> &'a C
    where
        C: ?Sized,
        F: FnOnce(&'a D) -> Option<&'a C>,
    {
        match select(self.handle) {
            Some(capability) => capability,
            None => missing_capability(self.handle.type_name(), operation),
        }
    }

    /// Name of the concrete type behind the handle.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.handle.type_name()
    }
}

impl<'a, D: ?Sized> std::ops::Deref for TraitRef<'a, D> {
    type Target = D;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl<'a, D> std::fmt::Debug for TraitRef<'a, D>
where
    D: ?Sized + Describe,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TraitRef({})", self.handle.type_name())
    }
}

/// The optional capabilities a concrete type provides, as a small bit set.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// No optional capability.
    pub const NONE: Self = Self(0);
    /// Bounded-wait acquisition.
    pub const TIMED: Self = Self(1 << 0);
    /// Shared (reader) acquisition.
    pub const SHARED: Self = Self(1 << 1);
    /// Bounded-wait shared acquisition.
    pub const SHARED_TIMED: Self = Self(1 << 2);
    /// Re-entrant acquisition by the owning thread.
    pub const RECURSIVE: Self = Self(1 << 3);

    const NAMES: [(CapabilitySet, &'static str); 4] = [
        (Self::TIMED, "timed"),
        (Self::SHARED, "shared"),
        (Self::SHARED_TIMED, "shared-timed"),
        (Self::RECURSIVE, "recursive"),
    ];

    /// Returns `true` if every capability in `other` is also in `self`.
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both sets.
    #[inline(always)]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Adds `other` to the set.
    #[inline(always)]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Returns `true` if no capability is present.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of capabilities in the set.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }
}

impl std::ops::BitOr for CapabilitySet {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = Self::NAMES
            .iter()
            .filter(|(cap, _)| self.contains(*cap))
            .map(|(_, name)| *name)
            .collect::<Vec<&str>>()
            .join(", ");
        write!(f, "{{{}}}", names)
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CapabilitySet{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Counter: Describe {
        fn count(&self) -> usize;
        fn resettable(&self) -> Option<&dyn Resettable> {
            None
        }
    }

    trait Resettable {
        fn reset_value(&self) -> usize;
    }

    struct Plain(usize);
    struct WithReset(usize);

    impl Describe for Plain {
        fn type_name(&self) -> &'static str {
            "Plain"
        }
    }

    impl Counter for Plain {
        fn count(&self) -> usize {
            self.0
        }
    }

    impl Describe for WithReset {
        fn type_name(&self) -> &'static str {
            "WithReset"
        }
    }

    impl Counter for WithReset {
        fn count(&self) -> usize {
            self.0
        }

        fn resettable(&self) -> Option<&dyn Resettable> {
            Some(self)
        }
    }

    impl Resettable for WithReset {
        fn reset_value(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_bind_and_invoke_dispatches_to_concrete_type() {
        let a = Plain(3);
        let b = WithReset(7);
        let refs: [TraitRef<'_, dyn Counter>; 2] = [TraitRef::bind(&a), TraitRef::bind(&b)];

        let counts: Vec<usize> = refs.iter().map(|r| r.invoke(|c| c.count())).collect();
        assert_eq!(counts, vec![3, 7]);
        assert_eq!(refs[0].type_name(), "Plain");
        assert_eq!(format!("{:?}", refs[1]), "TraitRef(WithReset)");
    }

    #[test]
    fn test_copies_refer_to_same_handle() {
        let a = Plain(1);
        let other = Plain(1);
        let r: TraitRef<'_, dyn Counter> = TraitRef::bind(&a);
        let copy = r;
        let foreign: TraitRef<'_, dyn Counter> = TraitRef::bind(&other);

        assert!(r.same_handle(&copy));
        assert!(!r.same_handle(&foreign));
    }

    #[test]
    fn test_require_resolves_present_capability() {
        let b = WithReset(9);
        let r: TraitRef<'_, dyn Counter> = TraitRef::bind(&b);
        let reset = r.require("reset_value", |c| c.resettable());
        assert_eq!(reset.reset_value(), 0);
    }

    #[test]
    #[should_panic(expected = "called `reset_value` on `Plain`, which does not provide that capability")]
    fn test_require_missing_capability_is_fatal() {
        let a = Plain(1);
        let r: TraitRef<'_, dyn Counter> = TraitRef::bind(&a);
        let _ = r.require("reset_value", |c| c.resettable());
    }

    #[test]
    fn test_capability_set_operations() {
        let mut set = CapabilitySet::NONE;
        assert!(set.is_empty());

        set.insert(CapabilitySet::TIMED);
        assert!(set.contains(CapabilitySet::TIMED));
        assert!(!set.contains(CapabilitySet::SHARED));

        let both = set | CapabilitySet::SHARED;
        assert!(both.contains(CapabilitySet::TIMED | CapabilitySet::SHARED));
        assert_eq!(both.len(), 2);
        assert_eq!(format!("{}", both), "{timed, shared}");
        assert_eq!(format!("{:?}", CapabilitySet::NONE), "CapabilitySet{}");
    }
}
