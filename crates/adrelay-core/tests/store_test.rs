//! Concurrency and isolation tests for the client payload store.
//!
//! Exercises the store from many threads and tasks at once to verify that
//! same-client writes never merge and that clients never observe each
//! other's payloads.

use std::{
    collections::HashSet,
    sync::{Arc, Barrier},
    thread,
    time::Duration,
};

use adrelay_core::{ClientPayloadStore, PayloadKind, RealClock, StoreConfig, TestClock};
use serde_json::{json, Value};

fn new_store(history_limit: usize) -> Arc<ClientPayloadStore> {
    Arc::new(ClientPayloadStore::new(
        StoreConfig { history_limit, allowed_clients: None },
        Arc::new(RealClock::new()),
    ))
}

fn campaign_body(writer: usize) -> Value {
    json!({
        "writer": writer,
        "campaign_name": format!("campaign-{writer}"),
        "spend": writer * 10,
        "actions": [{"action_type": "lead", "value": writer}],
    })
}

#[test]
fn concurrent_writes_to_one_client_leave_exactly_one_submitted_body() {
    let store = new_store(1);
    let writers = 16;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|writer| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.ingest("snob-motel", PayloadKind::Daily, campaign_body(writer))
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked").expect("ingest should succeed");
    }

    let latest = store.latest("snob-motel").unwrap().expect("latest should be present");
    let submitted: Vec<Value> = (0..writers).map(campaign_body).collect();

    assert!(submitted.contains(&latest.body), "latest body must be one submitted body");
    assert_eq!(latest.sequence, writers as u64);
    assert_eq!(store.status().total_ingests, writers as u64);
}

#[test]
fn concurrent_acks_have_unique_sequences_and_monotonic_timestamps() {
    let store = new_store(64);
    let writers = 8;
    let per_writer = 8;

    let handles: Vec<_> = (0..writers)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..per_writer)
                    .map(|i| {
                        store
                            .ingest("maria-cristina", PayloadKind::Weekly, json!([writer, i]))
                            .expect("ingest should succeed")
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut acks: Vec<_> =
        handles.into_iter().flat_map(|h| h.join().expect("writer thread panicked")).collect();
    acks.sort_by_key(|ack| ack.sequence);

    let sequences: HashSet<u64> = acks.iter().map(|ack| ack.sequence).collect();
    assert_eq!(sequences.len(), writers * per_writer);

    for pair in acks.windows(2) {
        assert!(pair[0].received_at <= pair[1].received_at, "timestamps follow sequence order");
    }

    let history = store.history("maria-cristina").unwrap();
    assert_eq!(history.len(), writers * per_writer);
    assert_eq!(history.last().map(|r| r.sequence), Some((writers * per_writer) as u64));
}

#[test]
fn writes_to_one_client_never_change_another() {
    let store = new_store(1);
    store.ingest("client-b", PayloadKind::Daily, json!({"spend": 7})).unwrap();
    let before = store.latest("client-b").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|writer| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    store
                        .ingest("client-a", PayloadKind::Daily, json!({"writer": writer, "i": i}))
                        .expect("ingest should succeed");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    assert_eq!(store.latest("client-b").unwrap(), before);
    assert_eq!(store.latest("client-a").unwrap().unwrap().sequence, 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_clients_ingest_in_parallel_tasks() {
    let store = new_store(2);

    let tasks: Vec<_> = (0..32)
        .map(|n| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let client = format!("client-{n:02}");
                store.ingest(&client, PayloadKind::Daily, json!({"n": n, "round": 1})).unwrap();
                tokio::task::yield_now().await;
                store.ingest(&client, PayloadKind::Daily, json!({"n": n, "round": 2})).unwrap();
            })
        })
        .collect();

    for task in tasks {
        task.await.expect("task panicked");
    }

    assert_eq!(store.status().clients, 32);
    assert_eq!(store.status().total_ingests, 64);

    for n in 0..32 {
        let client = format!("client-{n:02}");
        let latest = store.latest(&client).unwrap().unwrap();
        assert_eq!(latest.body, json!({"n": n, "round": 2}));
        assert_eq!(store.history(&client).unwrap().len(), 2);
    }
}

#[test]
fn reads_return_shared_records_without_copying_bodies() {
    let clock = TestClock::new();
    let store = ClientPayloadStore::new(StoreConfig::default(), Arc::new(clock.clone()));

    store.ingest("snob-motel", PayloadKind::Daily, json!({"spend": 100})).unwrap();
    clock.advance(Duration::from_secs(5));

    let first = store.latest("snob-motel").unwrap().unwrap();
    let second = store.latest("snob-motel").unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.status().uptime_seconds, 5);
}
