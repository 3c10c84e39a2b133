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

//! # strata-sync
//!
//! Lock-like resources and scoped guards over them.
//!
//! A resource implements `Lockable` and advertises bounded waits or shared
//! acquisition through optional capability accessors. `UniqueLock` and
//! `SharedLock` tie ownership to a scope and release it on drop; `Condvar`
//! waits on any lock held through a `UniqueLock`.
//!
//! ```rust
//! use strata_sync::{SharedLock, SharedMutex, UniqueLock};
//!
//! let rw = SharedMutex::new();
//! {
//!     let a = SharedLock::new(&rw);
//!     let b = SharedLock::new(&rw);
//!     assert!(a.owns_lock() && b.owns_lock());
//!     assert!(!UniqueLock::try_new(&rw).owns_lock());
//! }
//! assert!(UniqueLock::try_new(&rw).owns_lock());
//! ```

pub mod condvar;
pub mod lockable;
pub mod mutex;
pub mod shared_lock;
pub mod shared_mutex;
pub mod unique_lock;

pub use condvar::{Condvar, CondvarStatus};
pub use lockable::{Lockable, SharedLockable, TimedLockable, TimedSharedLockable};
pub use mutex::{Mutex, RecursiveMutex, RecursiveTimedMutex, TimedMutex};
pub use shared_lock::SharedLock;
pub use shared_mutex::{SharedMutex, SharedTimedMutex};
pub use unique_lock::UniqueLock;
