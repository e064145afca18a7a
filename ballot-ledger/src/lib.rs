//! VoteTrace Ballot Ledger
//!
//! Append-only, hash-linked ledger of voting events with whole-chain
//! integrity verification.
//!
//! # Architecture
//!
//! - **Hash Chaining**: every entry commits to its predecessor's digest, so
//!   altering or deleting a past record is detectable
//! - **Single Writer**: one logical writer task eliminates race conditions
//!   on the index / previous-digest lineage
//! - **Reproducible Genesis**: independently constructed ledgers share a
//!   byte-identical first entry, enabling cross-instance verification
//! - **Document Store**: one JSON document per entry, keyed by decimal index

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod storage;
pub mod types;

// Re-exports
pub use chain::{Chain, ChainFault, ChainStatus};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use storage::LedgerStore;
pub use types::{CandidateId, LedgerEntry, Payload, VoterId};
