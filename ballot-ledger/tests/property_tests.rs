//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Chain growth: appends never break validation
//! - Canonicalization: payload insertion order never affects the digest
//! - Tamper evidence: any single-field mutation is detected at its index
//! - Round-trip: the store returns the chain field-for-field, in index order

use ballot_ledger::{
    chain::{Chain, ChainFault, ChainStatus},
    crypto,
    storage::LedgerStore,
    types::{LedgerEntry, Payload},
    Config,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

/// Strategy for generating payload values
fn value_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        any::<bool>().prop_map(serde_json::Value::from),
    ]
}

/// Strategy for generating payloads
fn payload_strategy() -> impl Strategy<Value = Payload> {
    prop::collection::vec(("[a-z]{1,8}", value_strategy()), 0..6).prop_map(|fields| {
        let mut payload = Payload::new();
        for (key, value) in fields {
            payload.insert(key, value);
        }
        payload
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a chain stays valid through any sequence of appends, and
    /// every entry links to its predecessor
    #[test]
    fn prop_chain_growth_preserves_validity(payloads in prop::collection::vec(payload_strategy(), 1..20)) {
        let mut chain = Chain::new();
        for payload in payloads {
            chain.append(payload);
        }

        prop_assert_eq!(chain.validate(), ChainStatus::Valid);

        for window in chain.entries().windows(2) {
            prop_assert_eq!(&window[1].previous_digest, &window[0].digest);
            prop_assert_eq!(window[1].index, window[0].index + 1);
        }
    }

    /// Property: the digest is independent of payload field insertion order
    #[test]
    fn prop_digest_ignores_insertion_order(fields in prop::collection::vec(("[a-z]{1,8}", value_strategy()), 0..6)) {
        let mut forward = Payload::new();
        for (key, value) in fields.iter() {
            forward.insert(key.clone(), value.clone());
        }

        let mut reversed = Payload::new();
        for (key, value) in fields.iter().rev() {
            reversed.insert(key.clone(), value.clone());
        }

        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).single().unwrap();
        prop_assert_eq!(
            crypto::entry_digest(1, "prev", &ts, &forward, 0),
            crypto::entry_digest(1, "prev", &ts, &reversed, 0)
        );
    }

    /// Property: mutating any non-genesis entry's payload is detected at
    /// exactly that index
    #[test]
    fn prop_payload_tamper_detected_at_index(
        payloads in prop::collection::vec(payload_strategy(), 2..10),
        target in any::<prop::sample::Index>(),
    ) {
        let mut chain = Chain::new();
        for payload in payloads {
            chain.append(payload);
        }

        // Tamper a non-genesis entry through a scrambled-and-replaced copy
        let mut entries = chain.entries().to_vec();
        let victim = 1 + target.index(entries.len() - 1);
        // Key is outside the generator's alphabet, so it cannot collide
        entries[victim].payload.insert("TAMPERED".to_string(), json!(true));

        let mut tampered = Chain::new();
        tampered.replace(entries).unwrap();

        prop_assert_eq!(
            tampered.validate(),
            ChainStatus::Broken {
                index: victim as u64,
                fault: ChainFault::DigestMismatch,
            }
        );
    }

    /// Property: save then load returns the chain field-for-field, in index
    /// order, no matter how the store enumerates its keys
    #[test]
    fn prop_store_round_trip(payloads in prop::collection::vec(payload_strategy(), 0..15)) {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let mut chain = Chain::new();
        for payload in payloads {
            chain.append(payload);
        }

        let store = LedgerStore::open(&config).unwrap();
        store.save_chain(chain.entries()).unwrap();

        let loaded = store.load_chain().unwrap();
        prop_assert_eq!(loaded.as_slice(), chain.entries());
    }
}

mod integration_tests {
    use super::*;
    use ballot_ledger::types::{CandidateId, VoterId};
    use ballot_ledger::Ledger;

    /// End-to-end tamper scenario: two votes, then the stored digest of
    /// entry 1 is overwritten with garbage; the reloaded chain must fail
    /// validation at index 1.
    #[tokio::test]
    async fn test_stored_digest_tamper_detected_on_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();

        let ledger = Ledger::open(config.clone()).await.unwrap();
        ledger
            .cast_vote(VoterId::new("v1"), CandidateId::new("c1"))
            .await
            .unwrap();
        ledger
            .cast_vote(VoterId::new("v2"), CandidateId::new("c2"))
            .await
            .unwrap();
        ledger.save().await.unwrap();
        assert_eq!(ledger.validate().await.unwrap(), ChainStatus::Valid);
        ledger.shutdown().await.unwrap();

        // Overwrite the stored hash of entry 1 with garbage
        {
            let store = LedgerStore::open(&config).unwrap();
            let mut entry = store.get_entry(1).unwrap().unwrap();
            entry.digest = "deadbeef".repeat(8);
            store.put_entry(&entry).unwrap();
        }

        let reopened = Ledger::open(config).await.unwrap();
        assert_eq!(
            reopened.validate().await.unwrap(),
            ChainStatus::Broken {
                index: 1,
                fault: ChainFault::DigestMismatch,
            }
        );
        reopened.shutdown().await.unwrap();
    }

    /// Genesis entries from independent ledgers are byte-identical, so a
    /// chain written by one instance verifies in another.
    #[tokio::test]
    async fn test_cross_instance_verification() {
        let writer_dir = tempfile::tempdir().unwrap();
        let mut writer_config = Config::default();
        writer_config.data_dir = writer_dir.path().to_path_buf();

        let writer = Ledger::open(writer_config.clone()).await.unwrap();
        writer
            .cast_vote(VoterId::new("v1"), CandidateId::new("c1"))
            .await
            .unwrap();
        writer.save().await.unwrap();
        writer.shutdown().await.unwrap();

        // A fresh process over the same store
        let auditor = Ledger::open(writer_config).await.unwrap();
        assert_eq!(auditor.validate().await.unwrap(), ChainStatus::Valid);

        let genesis = auditor.entries().await.unwrap()[0].clone();
        assert_eq!(genesis, LedgerEntry::genesis());

        auditor.shutdown().await.unwrap();
    }
}
