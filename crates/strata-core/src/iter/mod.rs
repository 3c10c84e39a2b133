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

//! # Positions and Ranges
//!
//! A `Sequence` is anything indexable with a known length: slices, arrays,
//! `Vec` and `Container`. A `Position` is a borrowed back-reference into a
//! sequence plus an index, and doubles as a std iterator.
//!
//! A `Range` is a lazy view over `[begin, end)` of a sequence with an optional
//! filter. It keeps its own cursor, which can be driven step by step and
//! restarted, and compares cursors by range identity and index rather than by
//! address.
//!
//! Sequences that implement `SequenceMut` can also be transformed in place:
//! `Range::transform` rewrites every element and hands back a range over the
//! result, and `Range::transform_then_filter` filters the rewritten values.
//!
//! ## Usage
//!
//! ```rust
//! use strata_core::iter::Range;
//!
//! let data = [1, 2, 3, 4, 5];
//! let mut evens = Range::filtered(&data, |v: &i32| v % 2 == 0);
//!
//! assert_eq!(evens.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
//! assert_eq!(evens.sum(), 6);
//!
//! let first = evens.begin();
//! assert_eq!(evens.get(first), Some(&2));
//! assert_eq!(evens.next(), Some(&4));
//! assert_eq!(evens.next(), None);
//! ```

mod range;
mod sequence;

pub use range::{AcceptAll, Predicate, Range, RangeCursor, RangeId, RangeIter};
pub use sequence::{Position, Sequence, SequenceMut};
