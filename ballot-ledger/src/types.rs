//! Core types for the ballot ledger
//!
//! All types are designed for:
//! - Deterministic serialization (canonical JSON for hashing)
//! - Immutability (entries are values built by pure constructors)
//! - Round-trip fidelity through the document store

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto;

/// Opaque, application-defined payload of a ledger entry.
///
/// Field insertion order never affects the digest; hashing goes through
/// [`crypto::canonical_json`].
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Payload field carrying the voter identifier in vote-cast entries.
pub const VOTER_ID_FIELD: &str = "voterId";

/// Payload field carrying the candidate identifier in vote-cast entries.
pub const CANDIDATE_ID_FIELD: &str = "candidateId";

/// Payload field carrying the cast time in vote-cast entries.
pub const CAST_AT_FIELD: &str = "castAt";

/// Sentinel previous digest of the genesis entry.
pub const GENESIS_PREVIOUS_DIGEST: &str = "0";

/// Voter identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoterId(String);

impl VoterId {
    /// Create new voter ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(String);

impl CandidateId {
    /// Create new candidate ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record in the ledger, linked to its predecessor by digest.
///
/// Entries are immutable once constructed; any field change invalidates the
/// digest and is caught by [`Chain::validate`](crate::chain::Chain::validate).
///
/// The serialized shape is the persisted document contract:
/// `{ index, timestamp, data, previousHash, hash, nonce }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the chain, 0 for genesis, strictly increasing by 1
    pub index: u64,

    /// Creation time (ISO-8601 in serialized form)
    pub timestamp: DateTime<Utc>,

    /// Application payload
    #[serde(rename = "data")]
    pub payload: Payload,

    /// Digest of the entry at `index - 1`; sentinel `"0"` for genesis
    #[serde(rename = "previousHash")]
    pub previous_digest: String,

    /// Content digest over this entry's other fields
    #[serde(rename = "hash")]
    pub digest: String,

    /// Always zero; kept as part of the persisted record shape, never searched
    pub nonce: u64,
}

impl LedgerEntry {
    /// Construct the genesis entry.
    ///
    /// Every field is a fixed constant, so independently constructed genesis
    /// entries are byte-identical and any two ledgers can be cross-checked.
    pub fn genesis() -> Self {
        let timestamp = genesis_timestamp();
        let mut payload = Payload::new();
        payload.insert("genesis".to_string(), serde_json::Value::Bool(true));

        let digest = crypto::entry_digest(0, GENESIS_PREVIOUS_DIGEST, &timestamp, &payload, 0);

        Self {
            index: 0,
            timestamp,
            payload,
            previous_digest: GENESIS_PREVIOUS_DIGEST.to_string(),
            digest,
            nonce: 0,
        }
    }

    /// Construct the successor of `previous` carrying `payload`.
    pub fn next(previous: &LedgerEntry, payload: Payload) -> Self {
        let index = previous.index + 1;
        let timestamp = Utc::now();
        let digest = crypto::entry_digest(index, &previous.digest, &timestamp, &payload, 0);

        Self {
            index,
            timestamp,
            payload,
            previous_digest: previous.digest.clone(),
            digest,
            nonce: 0,
        }
    }

    /// Recompute the digest from this entry's own fields and compare it to
    /// the stored one.
    pub fn verify_digest(&self) -> bool {
        let recomputed = crypto::entry_digest(
            self.index,
            &self.previous_digest,
            &self.timestamp,
            &self.payload,
            self.nonce,
        );
        recomputed == self.digest
    }
}

/// Fixed creation time of the genesis entry.
fn genesis_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .expect("fixed genesis timestamp is unambiguous")
}
