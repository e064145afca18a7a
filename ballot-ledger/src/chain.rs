//! Append-only hash-linked chain and whole-chain validation
//!
//! The chain is the in-memory sequence of entries. It grows by append and is
//! only ever replaced wholesale (after a reload from storage); entries are
//! never mutated or removed. Validity is computed on demand, not cached:
//! any reload could change it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::{CandidateId, LedgerEntry, Payload, VoterId, CANDIDATE_ID_FIELD, VOTER_ID_FIELD};

/// Which check failed during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainFault {
    /// The first entry does not match the reproducible genesis entry
    GenesisMismatch,
    /// An entry's previous digest does not equal its predecessor's digest
    LinkMismatch,
    /// An entry's stored digest does not match its recomputed content digest
    DigestMismatch,
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFault::GenesisMismatch => write!(f, "genesis mismatch"),
            ChainFault::LinkMismatch => write!(f, "previous-digest link mismatch"),
            ChainFault::DigestMismatch => write!(f, "content digest mismatch"),
        }
    }
}

/// Outcome of validating a chain.
///
/// An invalid chain is an expected, actionable outcome (tampering detected),
/// so it is a structured result rather than an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainStatus {
    /// Every check passed for every entry
    Valid,
    /// Validation failed; fail-fast, so this is the first failing index
    Broken {
        /// Index of the entry that failed
        index: u64,
        /// Which check failed there
        fault: ChainFault,
    },
}

impl ChainStatus {
    /// True iff the chain validated cleanly
    pub fn is_valid(&self) -> bool {
        matches!(self, ChainStatus::Valid)
    }
}

/// Ordered, append-only sequence of ledger entries.
///
/// Invariant: never empty. Construction synthesizes the genesis entry, and
/// [`replace`](Chain::replace) rejects empty sequences.
#[derive(Debug, Clone)]
pub struct Chain {
    entries: Vec<LedgerEntry>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Create a fresh chain holding exactly the genesis entry.
    pub fn new() -> Self {
        Self {
            entries: vec![LedgerEntry::genesis()],
        }
    }

    /// Append a new entry carrying `payload` and return it.
    ///
    /// Extends the in-memory sequence only; persistence is a separate,
    /// explicit step.
    pub fn append(&mut self, payload: Payload) -> &LedgerEntry {
        let entry = LedgerEntry::next(self.latest(), payload);
        self.entries.push(entry);
        self.latest()
    }

    /// The last entry. Defined for all chain states since genesis guarantees
    /// non-emptiness.
    pub fn latest(&self) -> &LedgerEntry {
        self.entries.last().expect("chain is never empty")
    }

    /// All entries in index order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of entries (always at least 1).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the whole chain: genesis, predecessor links, and content
    /// digests.
    pub fn validate(&self) -> ChainStatus {
        self.validate_with(true)
    }

    /// Validate genesis and predecessor links only, skipping the content
    /// digest recomputation. Payload tampering inside an entry is NOT caught
    /// in this mode.
    pub fn validate_links_only(&self) -> ChainStatus {
        self.validate_with(false)
    }

    fn validate_with(&self, verify_digests: bool) -> ChainStatus {
        let genesis = LedgerEntry::genesis();
        let stored = &self.entries[0];
        if stored.index != genesis.index
            || stored.previous_digest != genesis.previous_digest
            || stored.digest != genesis.digest
        {
            return ChainStatus::Broken {
                index: 0,
                fault: ChainFault::GenesisMismatch,
            };
        }

        for window in self.entries.windows(2) {
            let (previous, current) = (&window[0], &window[1]);

            if current.previous_digest != previous.digest {
                return ChainStatus::Broken {
                    index: current.index,
                    fault: ChainFault::LinkMismatch,
                };
            }

            if verify_digests && !current.verify_digest() {
                return ChainStatus::Broken {
                    index: current.index,
                    fault: ChainFault::DigestMismatch,
                };
            }
        }

        ChainStatus::Valid
    }

    /// Replace the in-memory sequence wholesale (used after reloading from
    /// storage).
    ///
    /// Entries are sorted by index ascending first; storage enumeration order
    /// is not logical order. Gapped or duplicated indices are rejected as
    /// malformed. Validity is NOT checked here: a loaded-but-invalid chain is
    /// a distinct, queryable state, surfaced by [`validate`](Chain::validate).
    pub fn replace(&mut self, mut entries: Vec<LedgerEntry>) -> Result<()> {
        if entries.is_empty() {
            return Err(Error::EmptyStore);
        }

        entries.sort_by_key(|entry| entry.index);

        for (position, entry) in entries.iter().enumerate() {
            if entry.index != position as u64 {
                return Err(Error::MalformedRecord {
                    key: entry.index.to_string(),
                    reason: format!("expected index {position}, found {}", entry.index),
                });
            }
        }

        self.entries = entries;
        Ok(())
    }

    /// Linear scan (excluding genesis) for any entry whose payload matches
    /// the predicate.
    pub fn has_prior_record<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Payload) -> bool,
    {
        self.entries.iter().skip(1).any(|entry| predicate(&entry.payload))
    }

    /// Whether `voter` already appears in a vote-cast entry.
    pub fn has_voted(&self, voter: &VoterId) -> bool {
        self.has_prior_record(|payload| {
            payload
                .get(VOTER_ID_FIELD)
                .and_then(|value| value.as_str())
                .is_some_and(|id| id == voter.as_str())
        })
    }

    /// Count vote-cast entries per candidate. Entries without a candidate
    /// field (admin records, genesis) are skipped.
    pub fn tally(&self) -> BTreeMap<CandidateId, u64> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.iter().skip(1) {
            if let Some(candidate) = entry
                .payload
                .get(CANDIDATE_ID_FIELD)
                .and_then(|value| value.as_str())
            {
                *counts.entry(CandidateId::new(candidate)).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vote_payload(voter: &str, candidate: &str) -> Payload {
        let mut payload = Payload::new();
        payload.insert(VOTER_ID_FIELD.to_string(), json!(voter));
        payload.insert(CANDIDATE_ID_FIELD.to_string(), json!(candidate));
        payload
    }

    #[test]
    fn test_new_chain_is_genesis_only_and_valid() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.latest().index, 0);
        assert_eq!(chain.validate(), ChainStatus::Valid);
    }

    #[test]
    fn test_append_preserves_validity() {
        let mut chain = Chain::new();
        for i in 0..10 {
            chain.append(vote_payload(&format!("v{i}"), "c1"));
        }

        assert_eq!(chain.len(), 11);
        assert_eq!(chain.validate(), ChainStatus::Valid);

        for window in chain.entries().windows(2) {
            assert_eq!(window[1].previous_digest, window[0].digest);
            assert_eq!(window[1].index, window[0].index + 1);
        }
    }

    #[test]
    fn test_payload_tamper_is_caught_at_index() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));
        chain.append(vote_payload("v2", "c2"));

        chain.entries[1]
            .payload
            .insert(CANDIDATE_ID_FIELD.to_string(), json!("c9"));

        assert_eq!(
            chain.validate(),
            ChainStatus::Broken {
                index: 1,
                fault: ChainFault::DigestMismatch,
            }
        );
    }

    #[test]
    fn test_link_tamper_is_caught_at_index() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));
        chain.append(vote_payload("v2", "c2"));

        chain.entries[2].previous_digest = "f".repeat(64);

        assert_eq!(
            chain.validate(),
            ChainStatus::Broken {
                index: 2,
                fault: ChainFault::LinkMismatch,
            }
        );
    }

    #[test]
    fn test_genesis_tamper_is_caught() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));

        chain.entries[0].digest = "0".repeat(64);

        assert_eq!(
            chain.validate(),
            ChainStatus::Broken {
                index: 0,
                fault: ChainFault::GenesisMismatch,
            }
        );
    }

    #[test]
    fn test_links_only_mode_skips_content_checks() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));

        // Payload tamper: invisible to the weaker mode
        chain.entries[1]
            .payload
            .insert(CANDIDATE_ID_FIELD.to_string(), json!("c9"));
        assert_eq!(chain.validate_links_only(), ChainStatus::Valid);
        assert!(!chain.validate().is_valid());
    }

    #[test]
    fn test_replace_sorts_by_index() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));
        chain.append(vote_payload("v2", "c2"));

        let mut scrambled = chain.entries().to_vec();
        scrambled.reverse();

        let mut reloaded = Chain::new();
        reloaded.replace(scrambled).unwrap();

        assert_eq!(reloaded.entries(), chain.entries());
        assert_eq!(reloaded.validate(), ChainStatus::Valid);
    }

    #[test]
    fn test_replace_rejects_empty() {
        let mut chain = Chain::new();
        assert!(matches!(chain.replace(vec![]), Err(Error::EmptyStore)));
        // In-memory state unchanged
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_replace_rejects_gaps() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));
        chain.append(vote_payload("v2", "c2"));

        let mut gapped = chain.entries().to_vec();
        gapped.remove(1);

        let mut reloaded = Chain::new();
        let err = reloaded.replace(gapped).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_has_prior_record_excludes_genesis() {
        let chain = Chain::new();
        // The genesis marker never matches
        assert!(!chain.has_prior_record(|payload| payload.contains_key("genesis")));
    }

    #[test]
    fn test_has_voted() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));

        assert!(chain.has_voted(&VoterId::new("v1")));
        assert!(!chain.has_voted(&VoterId::new("v2")));
    }

    #[test]
    fn test_tally_counts_votes_per_candidate() {
        let mut chain = Chain::new();
        chain.append(vote_payload("v1", "c1"));
        chain.append(vote_payload("v2", "c2"));
        chain.append(vote_payload("v3", "c1"));

        // Admin record without a candidate field is not counted
        let mut note = Payload::new();
        note.insert("message".to_string(), json!("audit checkpoint"));
        chain.append(note);

        let counts = chain.tally();
        assert_eq!(counts.get(&CandidateId::new("c1")), Some(&2));
        assert_eq!(counts.get(&CandidateId::new("c2")), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
