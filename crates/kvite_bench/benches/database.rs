//! Database-level benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kvite_core::{Database, KvResult};

/// Benchmark transaction overhead (empty transaction).
fn bench_transaction_overhead(c: &mut Criterion) {
    c.bench_function("transaction_overhead", |b| {
        let db = Database::open_in_memory().unwrap();

        b.iter(|| {
            db.transaction(|_txn| -> KvResult<()> { Ok(()) }).unwrap();
        });
    });
}

/// Benchmark commits against a file database.
fn bench_file_commit(c: &mut Criterion) {
    c.bench_function("file_commit", |b| {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(temp.path().join("bench.db"), None).unwrap();
        let mut i = 0u64;

        b.iter(|| {
            i += 1;
            db.transaction(|txn| -> KvResult<()> {
                txn.bucket("bench").put(&format!("key_{i}"), b"value")
            })
            .unwrap();
        });
    });
}

/// Benchmark bucket listing.
fn bench_buckets(c: &mut Criterion) {
    c.bench_function("buckets", |b| {
        let db = Database::open_in_memory().unwrap();
        db.transaction(|txn| -> KvResult<()> {
            for i in 0..100 {
                txn.bucket(format!("bucket_{i}")).put("key", b"value")?;
            }
            Ok(())
        })
        .unwrap();

        b.iter(|| {
            black_box(db.buckets().unwrap());
        });
    });
}

/// Benchmark opening a database.
fn bench_open(c: &mut Criterion) {
    c.bench_function("open_in_memory", |b| {
        b.iter(|| {
            let db = Database::open_in_memory().unwrap();
            black_box(db);
        });
    });
}

criterion_group!(
    benches,
    bench_transaction_overhead,
    bench_file_commit,
    bench_buckets,
    bench_open,
);
criterion_main!(benches);
