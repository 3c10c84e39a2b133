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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use strata_core::alloc::SystemAllocator;
use strata_core::container::{Container, ContainerBuilder};
use strata_core::iter::Range;

const SIZES: [usize; 3] = [64, 1_024, 16_384];

fn random_values(n: usize, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(-1_000..1_000)).collect()
}

fn bench_push(c: &mut Criterion) {
    let alloc = SystemAllocator;
    let mut group = c.benchmark_group("container_push");

    for n in SIZES {
        let values = random_values(n, 0x5eed);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("container", n), &values, |b, values| {
            b.iter(|| {
                let mut container = Container::with_capacity(0, &alloc).unwrap();
                for &v in values {
                    container.push(black_box(v)).unwrap();
                }
                container
            })
        });

        group.bench_with_input(BenchmarkId::new("vec", n), &values, |b, values| {
            b.iter(|| {
                let mut vec = Vec::new();
                for &v in values {
                    vec.push(black_box(v));
                }
                vec
            })
        });
    }
    group.finish();
}

fn bench_remove_n(c: &mut Criterion) {
    let alloc = SystemAllocator;
    let mut group = c.benchmark_group("container_remove_n");

    for n in SIZES {
        let values = random_values(n, 0xdead);
        let mut rng = StdRng::seed_from_u64(n as u64);
        let spans: Vec<(usize, usize)> = (0..32)
            .map(|_| {
                let index = rng.random_range(0..n / 2);
                let count = rng.random_range(0..n / 4);
                (index, count)
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut container = ContainerBuilder::new()
                    .allocator(&alloc)
                    .capacity(values.len())
                    .destructor(|v: i64| {
                        black_box(v);
                    })
                    .build()
                    .unwrap();
                container.extend_from_slice(values).unwrap();
                for &(index, count) in &spans {
                    if container.remove_n(index, count).is_err() {
                        container.extend_from_slice(&values[..count]).unwrap();
                    }
                }
                container.len()
            })
        });
    }
    group.finish();
}

fn bench_filtered_range(c: &mut Criterion) {
    let alloc = SystemAllocator;
    let mut group = c.benchmark_group("range_filtered_sum");

    for n in SIZES {
        let values = random_values(n, 0xbeef);
        let mut container = Container::with_capacity(n, &alloc).unwrap();
        container.extend_from_slice(&values).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::new("cursor", n), |b| {
            b.iter(|| {
                let mut range = Range::filtered(&container, |v: &i64| v % 3 == 0);
                let mut total = range.current().copied().unwrap_or(0);
                while let Some(v) = range.next() {
                    total += v;
                }
                black_box(total)
            })
        });

        group.bench_function(BenchmarkId::new("sum", n), |b| {
            b.iter(|| black_box(Range::filtered(&container, |v: &i64| v % 3 == 0).sum()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_push, bench_remove_n, bench_filtered_range);
criterion_main!(benches);
