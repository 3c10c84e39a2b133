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
use crate::container::Container;
use crate::iter::{Position, Sequence, SequenceMut};
use crate::result::Result;
use num_traits::Zero;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RANGE_ID: AtomicU64 = AtomicU64::new(1);

/// Decides whether an element takes part in a filtered range.
pub trait Predicate<T: ?Sized> {
    fn test(&self, value: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> bool,
{
    #[inline(always)]
    fn test(&self, value: &T) -> bool {
        self(value)
    }
}

/// The predicate of an unfiltered range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcceptAll;

impl<T: ?Sized> Predicate<T> for AcceptAll {
    #[inline(always)]
    fn test(&self, _value: &T) -> bool {
        true
    }
}

/// Identity of a range. Clones of a range share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RangeId(u64);

impl RangeId {
    #[inline]
    fn next() -> Self {
        Self(NEXT_RANGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A logical position inside a range: the range identity plus an index into
/// the underlying sequence.
///
/// Equality compares both fields, never addresses, so cursors of a range and
/// of its clones compare equal while cursors of unrelated ranges over the same
/// data do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeCursor {
    range: RangeId,
    index: usize,
}

impl RangeCursor {
    #[inline]
    pub fn range(&self) -> RangeId {
        self.range
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A lazy, filtered, re-derivable view over `[begin, end)` of a sequence.
///
/// A range never owns the elements it walks. It keeps a cursor so traversal
/// can be driven step by step (`begin`, `next`, `current`) and restarted by
/// calling `begin` again after it is exhausted. `iter` provides an
/// independent std iterator that leaves the cursor alone.
pub struct Range<'a, S: ?Sized, P = AcceptAll> {
    seq: &'a S,
    begin: usize,
    end: usize,
    cursor: usize,
    predicate: P,
    id: RangeId,
}

impl<'a, S> Range<'a, S, AcceptAll>
where
    S: ?Sized + Sequence,
{
    /// A range over every element of `seq`.
    #[inline]
    pub fn new(seq: &'a S) -> Self {
        Self::filtered(seq, AcceptAll)
    }
}

impl<'a, S, P> Range<'a, S, P>
where
    S: ?Sized + Sequence,
    P: Predicate<S::Item>,
{
    /// A range over the elements of `seq` accepted by `predicate`.
    #[inline]
    pub fn filtered(seq: &'a S, predicate: P) -> Self {
        Self::from_span(seq, 0, seq.len(), predicate)
    }

    /// A range over `[begin, end)`.
    ///
    /// # Panics
    ///
    /// Panics if the positions refer to different sequences or if `begin`
    /// lies after `end`.
    #[track_caller]
    pub fn from_positions(begin: Position<'a, S>, end: Position<'a, S>, predicate: P) -> Self {
        assert!(
            begin.same_sequence(&end),
            "called `Range::from_positions` with positions over different sequences"
        );
        assert!(
            begin.index() <= end.index(),
            "called `Range::from_positions` with begin ({}) after end ({})",
            begin.index(),
            end.index()
        );
        Self::from_span(begin.sequence(), begin.index(), end.index(), predicate)
    }

    fn from_span(seq: &'a S, begin: usize, end: usize, predicate: P) -> Self {
        let mut range = Self {
            seq,
            begin,
            end,
            cursor: begin,
            predicate,
            id: RangeId::next(),
        };
        range.cursor = range.skip_from(begin);
        range
    }

    /// The identity shared by this range and its clones.
    #[inline]
    pub fn id(&self) -> RangeId {
        self.id
    }

    /// Restarts traversal: moves the cursor to the first accepted element
    /// and returns it. Returns `end()` if no element is accepted.
    pub fn begin(&mut self) -> RangeCursor {
        log::trace!("Range {} re-derived over [{}, {})", self.id, self.begin, self.end);
        self.cursor = self.skip_from(self.begin);
        self.cursor_at(self.cursor)
    }

    /// The cursor one past the span. The predicate is not consulted.
    #[inline]
    pub fn end(&self) -> RangeCursor {
        self.cursor_at(self.end)
    }

    /// The current cursor.
    #[inline]
    pub fn position(&self) -> RangeCursor {
        self.cursor_at(self.cursor)
    }

    /// The element under the cursor, or `None` once exhausted.
    #[inline]
    pub fn current(&self) -> Option<&'a S::Item> {
        if self.cursor < self.end {
            self.seq.at(self.cursor)
        } else {
            None
        }
    }

    /// Moves the cursor to the next accepted element and returns it, or
    /// `None` once the span is exhausted. Keeps returning `None` until
    /// `begin` is called again.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a S::Item> {
        if self.cursor >= self.end {
            return None;
        }
        self.cursor = self.skip_from(self.cursor + 1);
        self.current()
    }

    /// The element under `cursor`, or `None` at or past the end.
    ///
    /// # Panics
    ///
    /// Panics if `cursor` belongs to another range.
    #[track_caller]
    pub fn get(&self, cursor: RangeCursor) -> Option<&'a S::Item> {
        assert!(
            cursor.range == self.id,
            "called `Range::get` with a cursor of range {} on range {}",
            cursor.range,
            self.id
        );
        if cursor.index >= self.begin && cursor.index < self.end {
            self.seq.at(cursor.index)
        } else {
            None
        }
    }

    /// An iterator over the accepted elements, independent of the cursor.
    #[inline]
    pub fn iter(&self) -> RangeIter<'_, 'a, S, P> {
        RangeIter {
            seq: self.seq,
            front: self.begin,
            back: self.end,
            predicate: &self.predicate,
        }
    }

    /// A new range over the first `n` elements of this range's span, with the
    /// same predicate.
    pub fn take_first(&self, n: usize) -> Range<'a, S, P>
    where
        P: Clone,
    {
        let end = self.begin.saturating_add(n).min(self.end);
        Range::from_span(self.seq, self.begin, end, self.predicate.clone())
    }

    /// Number of accepted elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Folds the accepted elements into `init`.
    #[inline]
    pub fn accumulate<A, F>(&self, init: A, f: F) -> A
    where
        F: FnMut(A, &'a S::Item) -> A,
    {
        self.iter().fold(init, f)
    }

    /// Sum of the accepted elements.
    pub fn sum(&self) -> S::Item
    where
        S::Item: Zero + Clone,
    {
        self.accumulate(<S::Item as Zero>::zero(), |acc, value| acc + value.clone())
    }

    /// Copies the accepted elements into a new container on `allocator`.
    pub fn collect_into<'c>(&self, allocator: &'c dyn Allocator) -> Result<Container<'c, S::Item>>
    where
        S::Item: Clone,
    {
        let mut container = Container::with_capacity(self.count(), allocator)?;
        for value in self.iter() {
            container.push(value.clone())?;
        }
        Ok(container)
    }

    fn skip_from(&self, mut index: usize) -> usize {
        while index < self.end {
            match self.seq.at(index) {
                Some(value) if self.predicate.test(value) => return index,
                Some(_) => index += 1,
                None => return self.end,
            }
        }
        self.end
    }

    #[inline(always)]
    fn cursor_at(&self, index: usize) -> RangeCursor {
        RangeCursor {
            range: self.id,
            index,
        }
    }
}

impl<'a, S> Range<'a, S, AcceptAll>
where
    S: ?Sized + SequenceMut,
{
    /// Applies `f` to every element of `seq` in place and returns a range
    /// over the result.
    pub fn transform<F>(seq: &'a mut S, f: F) -> Self
    where
        F: FnMut(&mut S::Item),
    {
        transform_accepted(seq, &AcceptAll, f);
        Self::new(seq)
    }
}

impl<'a, S, P> Range<'a, S, P>
where
    S: ?Sized + SequenceMut,
    P: Predicate<S::Item>,
{
    /// Applies `f` in place to the elements of `seq` accepted by
    /// `predicate` and returns the filtered range.
    ///
    /// Each element is tested before it is transformed. The returned range
    /// tests the transformed values, so an element can drop out of it.
    pub fn transform_filtered<F>(seq: &'a mut S, predicate: P, f: F) -> Self
    where
        F: FnMut(&mut S::Item),
    {
        transform_accepted(seq, &predicate, f);
        Self::filtered(seq, predicate)
    }

    /// Applies `f` to every element of `seq` in place, then filters the
    /// result with `predicate`.
    pub fn transform_then_filter<F>(seq: &'a mut S, f: F, predicate: P) -> Self
    where
        F: FnMut(&mut S::Item),
    {
        transform_accepted(seq, &AcceptAll, f);
        Self::filtered(seq, predicate)
    }
}

fn transform_accepted<S, P, F>(seq: &mut S, predicate: &P, mut f: F)
where
    S: ?Sized + SequenceMut,
    P: Predicate<S::Item>,
    F: FnMut(&mut S::Item),
{
    let mut transformed = 0usize;
    for index in 0..seq.len() {
        if let Some(item) = seq.at_mut(index) {
            if predicate.test(item) {
                f(item);
                transformed += 1;
            }
        }
    }
    log::trace!("Range transformed {} of {} elements", transformed, seq.len());
}

impl<'a, S, P> Clone for Range<'a, S, P>
where
    S: ?Sized,
    P: Clone,
{
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            begin: self.begin,
            end: self.end,
            cursor: self.cursor,
            predicate: self.predicate.clone(),
            id: self.id,
        }
    }
}

impl<'a, S: ?Sized, P> std::fmt::Debug for Range<'a, S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Range")
            .field("id", &self.id)
            .field("begin", &self.begin)
            .field("end", &self.end)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<'r, 'a, S, P> IntoIterator for &'r Range<'a, S, P>
where
    S: ?Sized + Sequence,
    P: Predicate<S::Item>,
{
    type Item = &'a S::Item;
    type IntoIter = RangeIter<'r, 'a, S, P>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the accepted elements of a `Range`.
pub struct RangeIter<'r, 'a, S: ?Sized, P> {
    seq: &'a S,
    front: usize,
    back: usize,
    predicate: &'r P,
}

impl<'r, 'a, S: ?Sized, P> Clone for RangeIter<'r, 'a, S, P> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            front: self.front,
            back: self.back,
            predicate: self.predicate,
        }
    }
}

impl<'r, 'a, S, P> Iterator for RangeIter<'r, 'a, S, P>
where
    S: ?Sized + Sequence,
    P: Predicate<S::Item>,
{
    type Item = &'a S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let value = self.seq.at(self.front)?;
            self.front += 1;
            if self.predicate.test(value) {
                return Some(value);
            }
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back.saturating_sub(self.front)))
    }
}

impl<'r, 'a, S, P> DoubleEndedIterator for RangeIter<'r, 'a, S, P>
where
    S: ?Sized + Sequence,
    P: Predicate<S::Item>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.back > self.front {
            self.back -= 1;
            let value = self.seq.at(self.back)?;
            if self.predicate.test(value) {
                return Some(value);
            }
        }
        None
    }
}

impl<'r, 'a, S, P> FusedIterator for RangeIter<'r, 'a, S, P>
where
    S: ?Sized + Sequence,
    P: Predicate<S::Item>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CountingAllocator;

    fn is_even(v: &i32) -> bool {
        v % 2 == 0
    }

    #[test]
    fn test_unfiltered_range_visits_every_element() {
        let data = vec![0, 1, 2, 3];
        let range = Range::new(&data);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), data);
        assert_eq!(range.count(), 4);
    }

    #[test]
    fn test_filtered_traversal_and_re_derivation() {
        let data = [1, 2, 3, 4, 5];
        let mut range = Range::filtered(&data, is_even);

        let mut seen = Vec::new();
        let mut cursor = range.begin();
        while cursor != range.end() {
            seen.extend(range.get(cursor).copied());
            range.next();
            cursor = range.position();
        }
        assert_eq!(seen, vec![2, 4]);
        assert_eq!(range.next(), None);
        assert_eq!(range.current(), None);

        // Exhaustion does not end the range.
        let first = range.begin();
        assert_eq!(range.get(first), Some(&2));
        assert_eq!(range.next(), Some(&4));
        assert_eq!(range.next(), None);
        assert_eq!(range.next(), None);
    }

    #[test]
    fn test_begin_skips_leading_rejected_elements() {
        let data = [1, 3, 5, 6];
        let mut range = Range::filtered(&data, is_even);
        assert_eq!(range.begin().index(), 3);
        assert_eq!(range.current(), Some(&6));
    }

    #[test]
    fn test_nothing_accepted_begins_at_end() {
        let data = [1, 3, 5];
        let mut range = Range::filtered(&data, is_even);
        assert_eq!(range.begin(), range.end());
        assert_eq!(range.current(), None);
        assert_eq!(range.next(), None);
    }

    #[test]
    fn test_end_ignores_predicate() {
        let data = [1, 2, 3];
        let range = Range::filtered(&data, |_: &i32| false);
        assert_eq!(range.end().index(), 3);
    }

    #[test]
    fn test_cursor_equality_is_identity_plus_index() {
        let data = [1, 2, 3, 4];
        let mut a = Range::filtered(&data, is_even);
        let mut clone = a.clone();
        let mut unrelated = Range::filtered(&data, is_even);

        assert_eq!(a.id(), clone.id());
        assert_ne!(a.id(), unrelated.id());
        assert_eq!(a.begin(), clone.begin());
        assert_ne!(a.begin(), unrelated.begin());

        a.next();
        assert_ne!(a.position(), clone.position());
        clone.next();
        assert_eq!(a.position(), clone.position());
    }

    #[test]
    #[should_panic(expected = "called `Range::get` with a cursor of range")]
    fn test_foreign_cursor_is_fatal() {
        let data = [1, 2];
        let a = Range::new(&data);
        let b = Range::new(&data);
        let _ = a.get(b.position());
    }

    #[test]
    fn test_from_positions() {
        let data = vec![10, 11, 12, 13, 14];
        let range = Range::from_positions(
            Position::at_index(&data, 1),
            Position::at_index(&data, 4),
            AcceptAll,
        );
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![11, 12, 13]);
        assert_eq!(range.end().index(), 4);
    }

    #[test]
    #[should_panic(expected = "called `Range::from_positions` with positions over different sequences")]
    fn test_from_positions_over_different_sequences_is_fatal() {
        let a = [1, 2];
        let b = [1, 2];
        let _ = Range::from_positions(Position::begin(&a), Position::end(&b), AcceptAll);
    }

    #[test]
    #[should_panic(expected = "called `Range::from_positions` with begin (2) after end (1)")]
    fn test_from_positions_reversed_is_fatal() {
        let a = [1, 2, 3];
        let _ = Range::from_positions(Position::at_index(&a, 2), Position::at_index(&a, 1), AcceptAll);
    }

    #[test]
    fn test_take_first() {
        let data: Vec<i32> = (0..10).collect();
        let range = Range::new(&data).take_first(5);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(Range::new(&data).take_first(50).count(), 10);

        let evens = Range::filtered(&data, is_even).take_first(5);
        assert_eq!(evens.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn test_accumulate_sum_and_count() {
        let data: Vec<i32> = (0..10).collect();
        let evens = Range::filtered(&data, is_even);

        assert_eq!(evens.sum(), 20);
        assert_eq!(evens.count(), 5);
        assert_eq!(evens.accumulate(100, |acc, v| acc + v), 120);
        assert_eq!(
            evens.accumulate(String::new(), |acc, v| format!("{}{}", acc, v)),
            "02468"
        );

        let floats = [0.5f64, 1.5, 2.0];
        assert_eq!(Range::new(&floats).sum(), 4.0);
    }

    #[test]
    fn test_collect_into_container() {
        let data: Vec<i32> = (0..10).collect();
        let alloc = CountingAllocator::default();
        let evens = Range::filtered(&data, is_even).collect_into(&alloc).unwrap();

        assert_eq!(evens.as_slice(), &[0, 2, 4, 6, 8]);
        assert_eq!(evens.capacity(), 5);
        drop(evens);
        assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn test_iter_is_independent_and_clonable() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut range = Range::filtered(&data, is_even);
        range.next();

        let iter = range.iter();
        let copy = iter.clone();
        assert_eq!(iter.copied().collect::<Vec<_>>(), vec![2, 4, 6]);
        assert_eq!(copy.rev().copied().collect::<Vec<_>>(), vec![6, 4, 2]);
        assert_eq!(range.current(), Some(&4));

        let mut total = 0;
        for v in &range {
            total += v;
        }
        assert_eq!(total, 12);
    }

    #[test]
    fn test_transform_rewrites_every_element() {
        let mut data = vec![1, 2, 3];
        let range = Range::transform(&mut data, |v| *v *= 10);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(range.count(), 3);
        assert_eq!(data, vec![10, 20, 30]);
    }

    #[test]
    fn test_transform_filtered_leaves_rejected_elements_alone() {
        let mut data = [1, 2, 3, 4];
        let range = Range::transform_filtered(&mut data, is_even, |v| *v += 1);
        // 2 -> 3 and 4 -> 5 are no longer even, so the view is empty.
        assert_eq!(range.count(), 0);
        assert_eq!(data, [1, 3, 3, 5]);

        let mut data = [1, 2, 3, 4];
        let range = Range::transform_filtered(&mut data, is_even, |v| *v *= 3);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![6, 12]);
        assert_eq!(data, [1, 6, 3, 12]);
    }

    #[test]
    fn test_transform_then_filter_filters_transformed_values() {
        let mut data = [1, 2, 3, 4, 5];
        let mut range = Range::transform_then_filter(&mut data[..], |v| *v += 1, is_even);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![2, 4, 6]);
        assert_eq!(range.next(), Some(&4));
        assert_eq!(range.sum(), 12);
        assert_eq!(data, [2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_transform_over_empty_sequence() {
        let mut data: Vec<i32> = Vec::new();
        let mut calls = 0;
        let range = Range::transform(&mut data, |_| calls += 1);
        assert_eq!(range.count(), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_transform_container_in_place() {
        let alloc = CountingAllocator::default();
        let mut c = Container::new(&alloc).unwrap();
        for i in 1..=4 {
            c.push(i).unwrap();
        }
        let range = Range::transform_then_filter(&mut c, |v| *v = *v * *v, |v: &i32| *v > 4);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![9, 16]);
        assert_eq!(c.get(0), Some(&1));
    }

    #[test]
    fn test_range_over_container() {
        let alloc = CountingAllocator::default();
        let mut c = Container::new(&alloc).unwrap();
        for i in 1..=5 {
            c.push(i).unwrap();
        }
        let range = Range::filtered(&c, is_even);
        assert_eq!(range.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
    }
}
