// Criterion benchmarks for the minidubbo-common codec
//
// Run benchmarks with:
//   cargo bench -p minidubbo-common

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use minidubbo_common::{schema_of, BinaryCodec, Params, Request};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<(String, u32, f64)>,
}

fn sample_order(lines: usize) -> Order {
    Order {
        id: 42,
        customer: "xpleaf".to_string(),
        lines: (0..lines)
            .map(|i| (format!("sku-{}", i), i as u32, i as f64 * 1.25))
            .collect(),
    }
}

fn bench_schema_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_lookup");

    // First call populates the cache, the benchmark measures the hit path
    schema_of::<Order>();
    group.bench_function("cached_struct", |b| {
        b.iter(|| black_box(schema_of::<Order>()));
    });

    group.finish();
}

fn bench_value_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_codec");

    for lines in [1usize, 16, 256] {
        let order = sample_order(lines);
        let encoded = BinaryCodec::encode(&order).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", lines), &order, |b, order| {
            b.iter(|| BinaryCodec::encode(black_box(order)));
        });
        group.bench_with_input(BenchmarkId::new("decode", lines), &encoded, |b, bytes| {
            b.iter(|| BinaryCodec::decode::<Order>(black_box(bytes)));
        });
    }

    group.finish();
}

fn bench_request_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_codec");

    let args = ("hello".to_string(), 7u32, sample_order(16));
    group.bench_function("build_request", |b| {
        b.iter(|| Request::with_params("OrderService", "submit", black_box(&args)));
    });

    let request = Request::with_params("OrderService", "submit", &args).unwrap();
    let encoded = BinaryCodec::encode_request(&request).unwrap();
    group.bench_function("encode_request", |b| {
        b.iter(|| BinaryCodec::encode_request(black_box(&request)));
    });
    group.bench_function("decode_request", |b| {
        b.iter(|| BinaryCodec::decode_request(black_box(&encoded)));
    });
    group.bench_function("decode_params", |b| {
        b.iter(|| <(String, u32, Order)>::decode(black_box(&request.parameters)));
    });

    group.finish();
}

criterion_group!(benches, bench_schema_lookup, bench_value_codec, bench_request_codec);
criterion_main!(benches);
