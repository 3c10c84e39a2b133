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

//! Property-based tests for `Container`.
//!
//! Random operation sequences are applied to a `Container` and to a `Vec`
//! model side by side; the container must agree with the model, keep
//! `len <= capacity`, call the destructor hook exactly once per destroyed
//! element and return every byte to its allocator.

use proptest::prelude::*;
use std::cell::RefCell;

use strata_core::alloc::CountingAllocator;
use strata_core::container::{ContainerBuilder, DEFAULT_CAPACITY};
use strata_core::error::ContainerErrorCode;
use strata_core::iter::Range;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Insert(usize, i32),
    Remove(usize),
    RemoveN(usize, usize),
    Pop,
    Truncate(usize),
    Shrink,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => (0usize..40, any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => (0usize..40).prop_map(Op::Remove),
        1 => (0usize..40, 0usize..10).prop_map(|(i, n)| Op::RemoveN(i, n)),
        1 => Just(Op::Pop),
        1 => (0usize..40).prop_map(Op::Truncate),
        1 => Just(Op::Shrink),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn container_matches_vec_model(ops in prop::collection::vec(op(), 0..120)) {
        let destroyed = RefCell::new(Vec::new());
        let alloc = CountingAllocator::default();
        let mut model: Vec<i32> = Vec::new();
        let mut expected_destroyed: Vec<i32> = Vec::new();

        {
            let mut c = ContainerBuilder::new()
                .allocator(&alloc)
                .destructor(|v: i32| destroyed.borrow_mut().push(v))
                .build()
                .unwrap();

            for op in ops {
                match op {
                    Op::Push(v) => {
                        c.push(v).unwrap();
                        model.push(v);
                    }
                    Op::Insert(i, v) => {
                        let result = c.insert(i, v);
                        if i <= model.len() {
                            prop_assert!(result.is_ok());
                            model.insert(i, v);
                        } else {
                            prop_assert_eq!(
                                result.unwrap_err().container_code(),
                                Some(ContainerErrorCode::IndexOutOfBounds)
                            );
                        }
                    }
                    Op::Remove(i) => {
                        let result = c.remove(i);
                        if i < model.len() {
                            prop_assert!(result.is_ok());
                            expected_destroyed.push(model.remove(i));
                        } else {
                            prop_assert_eq!(
                                result.unwrap_err().container_code(),
                                Some(ContainerErrorCode::IndexOutOfBounds)
                            );
                        }
                    }
                    Op::RemoveN(i, n) => {
                        let result = c.remove_n(i, n);
                        if i + n <= model.len() {
                            prop_assert!(result.is_ok());
                            expected_destroyed.extend(model.drain(i..i + n));
                        } else {
                            prop_assert_eq!(
                                result.unwrap_err().container_code(),
                                Some(ContainerErrorCode::InvalidRange)
                            );
                        }
                    }
                    Op::Pop => {
                        prop_assert_eq!(c.pop(), model.pop());
                    }
                    Op::Truncate(n) => {
                        c.truncate(n);
                        if n < model.len() {
                            expected_destroyed.extend(model.drain(n..));
                        }
                    }
                    Op::Shrink => {
                        c.shrink_to_fit().unwrap();
                        prop_assert_eq!(c.capacity(), model.len());
                    }
                    Op::Clear => {
                        c.clear();
                        expected_destroyed.append(&mut model);
                    }
                }

                prop_assert!(c.len() <= c.capacity());
                prop_assert_eq!(c.as_slice(), model.as_slice());
                prop_assert_eq!(&*destroyed.borrow(), &expected_destroyed);
            }

            c.free();
        }

        expected_destroyed.extend(model.drain(..));
        prop_assert_eq!(&*destroyed.borrow(), &expected_destroyed);
        prop_assert_eq!(alloc.live_bytes(), 0);
        let stats = alloc.stats();
        prop_assert_eq!(stats.allocations, stats.deallocations);
    }

    #[test]
    fn growth_doubles_from_default_capacity(n in 1usize..300) {
        let alloc = CountingAllocator::default();
        let mut c = ContainerBuilder::new()
            .allocator(&alloc)
            .capacity(0)
            .build()
            .unwrap();
        for i in 0..n {
            c.push(i).unwrap();
        }

        let mut expected = DEFAULT_CAPACITY;
        while expected < n {
            expected *= 2;
        }
        prop_assert_eq!(c.capacity(), expected);
    }

    #[test]
    fn filtered_range_agrees_with_iterator_filter(
        values in prop::collection::vec(-50i32..50, 0..64),
        modulus in 1i32..6,
    ) {
        let keep = |v: &i32| v.rem_euclid(modulus) == 0;
        let expected: Vec<i32> = values.iter().copied().filter(|v| keep(v)).collect();

        let mut range = Range::filtered(&values, keep);
        prop_assert_eq!(range.iter().copied().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(range.count(), expected.len());
        prop_assert_eq!(range.sum(), expected.iter().sum::<i32>());

        // Stepping the cursor visits the same elements, twice in a row.
        for _ in 0..2 {
            let mut stepped = Vec::new();
            let first = range.begin();
            stepped.extend(range.get(first).copied());
            while let Some(v) = range.next() {
                stepped.push(*v);
            }
            prop_assert_eq!(&stepped, &expected);
        }
    }
}
