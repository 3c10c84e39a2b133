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

//! # Generic Container
//!
//! `Container<'a, T>` is a growable contiguous buffer parametrised by its
//! element type, the allocator it borrows and a record of per-element
//! lifecycle hooks. It behaves like `Vec<T>` with three differences:
//!
//! - storage comes from a `&dyn Allocator`, never directly from the global
//!   allocator,
//! - constructing, copying and destroying elements can be redirected through
//!   `ElementHooks`,
//! - growth and index failures are recoverable `Result`s carrying a
//!   `ContainerErrorCode`, never panics.
//!
//! ## Usage
//!
//! ```rust
//! use strata_core::alloc::SystemAllocator;
//! use strata_core::container::Container;
//!
//! let alloc = SystemAllocator;
//! let mut c = Container::new(&alloc).unwrap();
//! c.push(3).unwrap();
//! c.push(1).unwrap();
//! c.insert(1, 2).unwrap();
//! assert_eq!(c.as_slice(), &[3, 2, 1]);
//! assert_eq!(format!("{}", c), "[3, 2, 1]");
//! ```

mod builder;
mod hooks;
mod vector;

pub use builder::ContainerBuilder;
pub use hooks::ElementHooks;
pub use vector::Container;

/// Capacity of a freshly created container, and the first capacity of one
/// that starts empty.
pub const DEFAULT_CAPACITY: usize = 8;
