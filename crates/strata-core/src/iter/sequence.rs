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

use crate::container::Container;
use std::iter::FusedIterator;

/// An indexable run of elements that positions and ranges can walk.
pub trait Sequence {
    /// The element type.
    type Item;

    /// Number of elements.
    fn len(&self) -> usize;

    /// The element at `index`, or `None` past the end.
    fn at(&self, index: usize) -> Option<&Self::Item>;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Sequence for [T] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T, const N: usize> Sequence for [T; N] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> Sequence for Vec<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

impl<T> Sequence for Container<'_, T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        Container::len(self)
    }

    #[inline]
    fn at(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// A `Sequence` whose elements can be modified in place.
pub trait SequenceMut: Sequence {
    /// The element at `index` for writing, or `None` past the end.
    fn at_mut(&mut self, index: usize) -> Option<&mut Self::Item>;
}

impl<T> SequenceMut for [T] {
    #[inline]
    fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }
}

impl<T, const N: usize> SequenceMut for [T; N] {
    #[inline]
    fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }
}

impl<T> SequenceMut for Vec<T> {
    #[inline]
    fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }
}

impl<T> SequenceMut for Container<'_, T> {
    #[inline]
    fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.get_mut(index)
    }
}

/// A position inside a `Sequence`: a borrowed back-reference plus an index
/// in `[0, len]`.
///
/// Two positions are equal when they refer to the same sequence and the same
/// index. A position is also an iterator over the elements from its index to
/// the end of the sequence.
pub struct Position<'a, S: ?Sized> {
    seq: &'a S,
    index: usize,
    // Exclusive bound for iteration from the back.
    back: usize,
}

impl<'a, S: ?Sized> Clone for Position<'a, S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, S: ?Sized> Copy for Position<'a, S> {}

impl<'a, S> Position<'a, S>
where
    S: ?Sized + Sequence,
{
    /// A position at the first element of `seq`.
    #[inline]
    pub fn begin(seq: &'a S) -> Self {
        Self {
            seq,
            index: 0,
            back: seq.len(),
        }
    }

    /// A position one past the last element of `seq`.
    #[inline]
    pub fn end(seq: &'a S) -> Self {
        let len = seq.len();
        Self {
            seq,
            index: len,
            back: len,
        }
    }

    /// A position at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > seq.len()`.
    #[inline]
    pub fn at_index(seq: &'a S, index: usize) -> Self {
        let len = seq.len();
        assert!(
            index <= len,
            "called `Position::at_index` with index out of bounds: the len is {} but the index is {}",
            len,
            index
        );
        Self {
            seq,
            index,
            back: len,
        }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The sequence this position refers to.
    #[inline(always)]
    pub fn sequence(&self) -> &'a S {
        self.seq
    }

    /// Returns `true` if `other` refers to the same sequence. For unsized
    /// sequences the length is part of the identity.
    #[inline]
    pub fn same_sequence(&self, other: &Self) -> bool {
        std::ptr::eq(self.seq, other.seq)
    }

    /// Returns `true` if the position is one past the last element.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index >= self.seq.len()
    }

    /// The element at this position; `None` at the end.
    #[inline]
    pub fn current(&self) -> Option<&'a S::Item> {
        self.seq.at(self.index)
    }

    /// Moves one element forward.
    ///
    /// # Panics
    ///
    /// Panics if the position is already at the end.
    #[inline]
    #[track_caller]
    pub fn advance(&mut self) {
        assert!(
            !self.is_end(),
            "called `Position::advance` on a position at the end of its sequence"
        );
        self.index += 1;
    }

    /// Moves one element back.
    ///
    /// # Panics
    ///
    /// Panics if the position is at the first element.
    #[inline]
    #[track_caller]
    pub fn retreat(&mut self) {
        assert!(
            self.index > 0,
            "called `Position::retreat` on a position at the start of its sequence"
        );
        self.index -= 1;
    }
}

impl<'a, S> PartialEq for Position<'a, S>
where
    S: ?Sized + Sequence,
{
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.same_sequence(other)
    }
}

impl<'a, S> Eq for Position<'a, S> where S: ?Sized + Sequence {}

impl<'a, S: ?Sized> std::fmt::Debug for Position<'a, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<'a, S> Iterator for Position<'a, S>
where
    S: ?Sized + Sequence,
{
    type Item = &'a S::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.back {
            return None;
        }
        let item = self.seq.at(self.index)?;
        self.index += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, S> DoubleEndedIterator for Position<'a, S>
where
    S: ?Sized + Sequence,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back <= self.index {
            return None;
        }
        self.back -= 1;
        self.seq.at(self.back)
    }
}

impl<'a, S> ExactSizeIterator for Position<'a, S> where S: ?Sized + Sequence {}

impl<'a, S> FusedIterator for Position<'a, S> where S: ?Sized + Sequence {}
