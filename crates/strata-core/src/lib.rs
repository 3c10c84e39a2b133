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

//! # strata-core
//!
//! Load-bearing generic building blocks: capability dispatch over trait
//! objects, a code-plus-category error model on top of the native `Result`
//! and `Option`, an allocator-aware container with per-element lifecycle
//! hooks, and a position/range protocol for lazy, filtered traversal.
//!
//! ## Modules
//!
//! - `dispatch`: `TraitRef`, `Describe`, `CapabilitySet` and the fatal
//!   `missing_capability` path for optional operations.
//! - `error`: `Error`, `ErrorCategory` and the built-in categories.
//! - `result`: `Result`, the `Outcome` operation set and extension traits.
//! - `alloc`: the `Allocator` capability, `SystemAllocator`,
//!   `CountingAllocator` and the `ScopedBuffer` guard.
//! - `container`: `Container`, `ElementHooks` and `ContainerBuilder`.
//! - `iter`: `Sequence`, `Position`, `Range` and `RangeCursor`.

pub mod alloc;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod iter;
pub mod result;

pub use error::Error;
pub use result::Result;
