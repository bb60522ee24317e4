//! Performance benchmarks for the client payload store.
//!
//! Tracks the cost of the hot paths: ingesting into one client slot,
//! ingesting across many clients, and reading the latest payload.

use std::{hint::black_box, sync::Arc, thread};

use adrelay_core::{ClientPayloadStore, PayloadKind, RealClock, StoreConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

fn new_store(history_limit: usize) -> Arc<ClientPayloadStore> {
    Arc::new(ClientPayloadStore::new(
        StoreConfig { history_limit, allowed_clients: None },
        Arc::new(RealClock::new()),
    ))
}

/// Weekly-sized payload with `campaigns` rows.
fn generate_payload(campaigns: usize) -> Value {
    Value::Array(
        (0..campaigns)
            .map(|i| {
                json!({
                    "campaign_name": format!("campaign-{i}"),
                    "spend": i * 10,
                    "impressions": i * 1000,
                    "clicks": i * 25,
                })
            })
            .collect(),
    )
}

/// Benchmarks repeated ingests into a single client.
fn bench_single_client_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_single_client");
    group.throughput(Throughput::Elements(1));

    for history_limit in [1, 16, 256] {
        let store = new_store(history_limit);
        let payload = generate_payload(10);

        group.bench_with_input(
            BenchmarkId::new("history_limit", history_limit),
            &history_limit,
            |b, _| {
                b.iter(|| {
                    store
                        .ingest(black_box("snob-motel"), PayloadKind::Daily, payload.clone())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmarks ingests spread across many clients from several threads.
fn bench_parallel_clients(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_parallel_clients");
    let threads = 4;
    let per_thread = 256;
    group.throughput(Throughput::Elements((threads * per_thread) as u64));

    group.bench_function("4x256", |b| {
        b.iter(|| {
            let store = new_store(1);
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..per_thread {
                            let client = format!("client-{t}-{}", i % 32);
                            store.ingest(&client, PayloadKind::Daily, json!({"i": i})).unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            black_box(store.status())
        });
    });

    group.finish();
}

/// Benchmarks reading the latest payload, which clones an `Arc` only.
fn bench_latest_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("latest");

    for campaigns in [1, 100, 1000] {
        let store = new_store(1);
        store.ingest("snob-motel", PayloadKind::Weekly, generate_payload(campaigns)).unwrap();

        group.bench_with_input(BenchmarkId::new("campaigns", campaigns), &campaigns, |b, _| {
            b.iter(|| black_box(store.latest(black_box("snob-motel")).unwrap()));
        });
    }

    group.bench_function("absent", |b| {
        let store = new_store(1);
        b.iter(|| black_box(store.latest(black_box("unknown-client")).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_single_client_ingest, bench_parallel_clients, bench_latest_lookup);
criterion_main!(benches);
