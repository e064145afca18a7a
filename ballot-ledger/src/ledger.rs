//! Main ledger orchestration layer
//!
//! This module ties together the chain, storage, and actor components into a
//! high-level API for recording and auditing voting events.
//!
//! # Example
//!
//! ```no_run
//! use ballot_ledger::{Config, Ledger};
//! use ballot_ledger::types::{CandidateId, VoterId};
//!
//! #[tokio::main]
//! async fn main() -> ballot_ledger::Result<()> {
//!     let config = Config::default();
//!     let ledger = Ledger::open(config).await?;
//!
//!     ledger.cast_vote(VoterId::new("v1"), CandidateId::new("c1")).await?;
//!     ledger.save().await?;
//!
//!     assert!(ledger.validate().await?.is_valid());
//!     ledger.shutdown().await
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle},
    chain::{Chain, ChainStatus},
    metrics::Metrics,
    types::{CandidateId, LedgerEntry, Payload, VoterId},
    Config, Error, LedgerStore, Result,
};

/// Main ledger interface
///
/// Constructed and owned by the caller; there is no module-level instance.
/// Handlers that need the ledger receive it explicitly.
pub struct Ledger {
    /// Actor handle for all chain operations
    handle: LedgerHandle,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open a ledger with configuration.
    ///
    /// If the store already holds a chain it is loaded and its validity is
    /// logged; a loaded-but-invalid chain is still opened, so auditors can
    /// inspect it. An empty store is initialized with the genesis entry.
    pub async fn open(config: Config) -> Result<Self> {
        let store = Arc::new(LedgerStore::open(&config)?);
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("failed to initialize metrics: {e}")))?;

        let persisted = store.load_chain()?;
        let chain = if persisted.is_empty() {
            let chain = Chain::new();
            store.save_chain(chain.entries())?;
            tracing::info!("Initialized new ledger with genesis entry");
            chain
        } else {
            let mut chain = Chain::new();
            chain.replace(persisted)?;

            let status = if config.validation.verify_digests {
                chain.validate()
            } else {
                chain.validate_links_only()
            };
            match status {
                ChainStatus::Valid => {
                    tracing::info!(entries = chain.len(), "Loaded persisted chain");
                }
                ChainStatus::Broken { index, fault } => {
                    tracing::warn!(
                        entries = chain.len(),
                        index,
                        %fault,
                        "Loaded persisted chain FAILED validation"
                    );
                }
            }
            chain
        };

        metrics.chain_length.set(chain.len() as i64);

        let handle = spawn_ledger_actor(chain, store, config.validation.clone());

        Ok(Self {
            handle,
            metrics,
            config,
        })
    }

    /// Append an entry carrying an arbitrary payload.
    ///
    /// Extends the in-memory chain only; call [`save`](Ledger::save) to
    /// persist.
    pub async fn append(&self, payload: Payload) -> Result<LedgerEntry> {
        let start = Instant::now();
        let entry = self.handle.append(payload).await?;

        self.metrics.entries_appended.inc();
        self.metrics
            .append_duration
            .observe(start.elapsed().as_secs_f64());
        self.metrics.chain_length.set(entry.index as i64 + 1);

        Ok(entry)
    }

    /// Record a vote, enforcing one vote per voter.
    pub async fn cast_vote(&self, voter: VoterId, candidate: CandidateId) -> Result<LedgerEntry> {
        let start = Instant::now();
        match self.handle.cast_vote(voter, candidate).await {
            Ok(entry) => {
                self.metrics.entries_appended.inc();
                self.metrics
                    .append_duration
                    .observe(start.elapsed().as_secs_f64());
                self.metrics.chain_length.set(entry.index as i64 + 1);
                Ok(entry)
            }
            Err(err) => {
                if matches!(err, Error::DuplicateVote(_)) {
                    self.metrics.votes_rejected.inc();
                }
                Err(err)
            }
        }
    }

    /// Persist the chain to the store.
    pub async fn save(&self) -> Result<()> {
        self.handle.save().await
    }

    /// Replace the in-memory chain from the store and report its validity.
    ///
    /// A failed reload leaves the in-memory chain unchanged.
    pub async fn reload(&self) -> Result<ChainStatus> {
        let status = self.handle.reload().await?;
        self.metrics.reloads.inc();
        if !status.is_valid() {
            self.metrics.validation_failures.inc();
        }

        let latest = self.handle.latest().await?;
        self.metrics.chain_length.set(latest.index as i64 + 1);

        Ok(status)
    }

    /// Validate the whole chain.
    pub async fn validate(&self) -> Result<ChainStatus> {
        let status = self.handle.validate().await?;
        if !status.is_valid() {
            self.metrics.validation_failures.inc();
        }
        Ok(status)
    }

    /// The last entry.
    pub async fn latest(&self) -> Result<LedgerEntry> {
        self.handle.latest().await
    }

    /// All entries in index order.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.handle.entries().await
    }

    /// Whether `voter` already cast a vote.
    pub async fn has_voted(&self, voter: VoterId) -> Result<bool> {
        self.handle.has_voted(voter).await
    }

    /// Vote counts per candidate.
    pub async fn tally(&self) -> Result<BTreeMap<CandidateId, u64>> {
        self.handle.tally().await
    }

    /// Metrics collector (for scraping or inspection).
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration this ledger was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shutdown the ledger, releasing the store.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }
}
