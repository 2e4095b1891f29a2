//! Criterion micro-benchmarks for the migration codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wisp_bench::{reference_items, reference_schema};
use wisp_wire::{decode_items, encode_items, item_stride};

/// Benchmark: encode 64 migration items under the reference schema.
fn bench_encode_items(c: &mut Criterion) {
    let schema = reference_schema();
    let items = reference_items(64);

    c.bench_function("wire_encode_64_items", |b| {
        b.iter(|| {
            let bytes = encode_items(black_box(&items), &schema).unwrap();
            black_box(bytes);
        });
    });
}

/// Benchmark: decode 64 migration items under the reference schema.
fn bench_decode_items(c: &mut Criterion) {
    let schema = reference_schema();
    let items = reference_items(64);
    let bytes = encode_items(&items, &schema).unwrap();
    assert_eq!(bytes.len(), 64 * item_stride(&schema));

    c.bench_function("wire_decode_64_items", |b| {
        b.iter(|| {
            let decoded = decode_items(black_box(&bytes), &schema).unwrap();
            black_box(decoded);
        });
    });
}

criterion_group!(benches, bench_encode_items, bench_decode_items);
criterion_main!(benches);
