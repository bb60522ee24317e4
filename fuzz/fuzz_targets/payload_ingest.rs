#![no_main]

//! Fuzz target for the ingest body path.
//!
//! Feeds arbitrary bytes through the same parsing the HTTP layer applies and
//! into the store, checking that nothing panics and that an accepted body is
//! exactly what the store reports as latest.

use std::sync::Arc;

use adrelay_api::handlers::ingest::parse_payload;
use adrelay_core::{ClientPayloadStore, PayloadKind, RelayError, StoreConfig, TestClock};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };

    let split = usize::from(selector & 0x0f).min(rest.len());
    let (client_bytes, body) = rest.split_at(split);
    let client_id = String::from_utf8_lossy(client_bytes);
    let kind = if selector & 0x80 == 0 { PayloadKind::Daily } else { PayloadKind::Weekly };

    let Ok(payload) = parse_payload(body, kind) else {
        return;
    };

    let store = ClientPayloadStore::new(StoreConfig::default(), Arc::new(TestClock::new()));
    match store.ingest(&client_id, kind, payload.clone()) {
        Ok(ack) => {
            assert_eq!(ack.sequence, 1);
            let latest = store.latest(&client_id).ok().flatten().map(|r| r.body.clone());
            assert_eq!(latest, Some(payload));
        },
        Err(RelayError::InvalidClientId) => assert!(client_id.is_empty()),
        Err(e) => panic!("unexpected ingest error: {e}"),
    }
});
