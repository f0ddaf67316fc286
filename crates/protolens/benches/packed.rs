// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packed vs Unpacked Repeated Field Benchmark
//!
//! Encodes and decodes `repeated int32 num` filled with the value 5, once
//! with the packed layout (`FooPacked`) and once unpacked (`FooUnpacked`).
//! Sizes are printed before the timings.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protolens::{Message, UnknownFields};

mod fields {
    protolens::field_lenses!(num);
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "foo.FooPacked")]
struct FooPacked {
    #[proto(tag = 1, packed)]
    num: Vec<i32>,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "foo.FooUnpacked")]
struct FooUnpacked {
    #[proto(tag = 1)]
    num: Vec<i32>,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

const SIZES: [usize; 4] = [10, 100, 1_000, 10_000];
const VALUE: i32 = 5;

fn packed(count: usize) -> FooPacked {
    protolens::Builder::<FooPacked>::new()
        .set(fields::num, vec![VALUE; count])
        .build()
}

fn unpacked(count: usize) -> FooUnpacked {
    protolens::Builder::<FooUnpacked>::new()
        .set(fields::num, vec![VALUE; count])
        .build()
}

fn report_sizes() {
    println!("{:>8} {:>12} {:>12} {:>8}", "elements", "packed", "unpacked", "ratio");
    for &count in &SIZES {
        let p = packed(count).encode_to_vec().len();
        let u = unpacked(count).encode_to_vec().len();
        println!("{:>8} {:>12} {:>12} {:>8.3}", count, p, u, p as f64 / u as f64);
    }
}

fn bench_encode(c: &mut Criterion) {
    report_sizes();

    let mut group = c.benchmark_group("encode");
    for &count in &SIZES {
        group.throughput(Throughput::Elements(count as u64));

        let message = packed(count);
        group.bench_with_input(BenchmarkId::new("packed", count), &message, |b, m| {
            b.iter(|| black_box(m.encode_to_vec()));
        });

        let message = unpacked(count);
        group.bench_with_input(BenchmarkId::new("unpacked", count), &message, |b, m| {
            b.iter(|| black_box(m.encode_to_vec()));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for &count in &SIZES {
        group.throughput(Throughput::Elements(count as u64));

        let bytes = packed(count).encode_to_vec();
        group.bench_with_input(BenchmarkId::new("packed", count), &bytes, |b, bytes| {
            b.iter(|| FooPacked::decode(black_box(bytes)).expect("decode"));
        });

        let bytes = unpacked(count).encode_to_vec();
        group.bench_with_input(BenchmarkId::new("unpacked", count), &bytes, |b, bytes| {
            b.iter(|| FooUnpacked::decode(black_box(bytes)).expect("decode"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
