//! Actor-based concurrency for the ledger
//!
//! One task owns the in-memory chain and the store handle; every mutation and
//! persistence operation flows through its mailbox. Two concurrent appends
//! can therefore never race on the same index / previous-digest lineage.
//!
//! Digest computation happens synchronously inside the actor; suspension
//! points exist only at the mailbox and store boundaries. A reload builds the
//! replacement sequence fully before swapping, so a failed or abandoned load
//! leaves the in-memory chain unchanged.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use crate::chain::{Chain, ChainStatus};
use crate::config::ValidationConfig;
use crate::crypto;
use crate::error::{Error, Result};
use crate::storage::LedgerStore;
use crate::types::{
    CandidateId, LedgerEntry, Payload, VoterId, CANDIDATE_ID_FIELD, CAST_AT_FIELD, VOTER_ID_FIELD,
};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Append a new entry carrying an arbitrary payload
    Append {
        /// Entry payload
        payload: Payload,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEntry>>,
    },

    /// Append a vote-cast entry, gated on one vote per voter
    CastVote {
        /// Voter casting the ballot
        voter: VoterId,
        /// Chosen candidate
        candidate: CandidateId,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEntry>>,
    },

    /// Get the latest entry
    Latest {
        /// Reply channel
        response: oneshot::Sender<LedgerEntry>,
    },

    /// Get all entries in index order
    Entries {
        /// Reply channel
        response: oneshot::Sender<Vec<LedgerEntry>>,
    },

    /// Validate the whole chain
    Validate {
        /// Reply channel
        response: oneshot::Sender<ChainStatus>,
    },

    /// Persist the chain to the store
    Save {
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Replace the in-memory chain from the store and report its validity
    Reload {
        /// Reply channel
        response: oneshot::Sender<Result<ChainStatus>>,
    },

    /// Whether a voter already appears in a vote-cast entry
    HasVoted {
        /// Voter to look up
        voter: VoterId,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Count vote-cast entries per candidate
    Tally {
        /// Reply channel
        response: oneshot::Sender<BTreeMap<CandidateId, u64>>,
    },

    /// Shutdown actor
    Shutdown {
        /// Acknowledged once the actor has released its store handle
        response: oneshot::Sender<()>,
    },
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// In-memory chain, exclusively owned
    chain: Chain,

    /// Entry store
    store: Arc<LedgerStore>,

    /// Validation configuration
    validation: ValidationConfig,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(
        chain: Chain,
        store: Arc<LedgerStore>,
        validation: ValidationConfig,
        mailbox: mpsc::Receiver<LedgerMessage>,
    ) -> Self {
        Self {
            chain,
            store,
            validation,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let mut shutdown_ack = None;
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown { response } => {
                    shutdown_ack = Some(response);
                    break;
                }
                other => self.handle_message(other),
            }
        }

        // Release the store handle before acknowledging, so a caller that
        // awaited shutdown can reopen the same data directory immediately.
        drop(self.store);
        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Append { payload, response } => {
                let entry = self.chain.append(payload).clone();
                tracing::debug!(index = entry.index, "Entry appended");
                let _ = response.send(Ok(entry));
            }

            LedgerMessage::CastVote {
                voter,
                candidate,
                response,
            } => {
                let _ = response.send(self.cast_vote(voter, candidate));
            }

            LedgerMessage::Latest { response } => {
                let _ = response.send(self.chain.latest().clone());
            }

            LedgerMessage::Entries { response } => {
                let _ = response.send(self.chain.entries().to_vec());
            }

            LedgerMessage::Validate { response } => {
                let _ = response.send(self.validate());
            }

            LedgerMessage::Save { response } => {
                let _ = response.send(self.store.save_chain(self.chain.entries()));
            }

            LedgerMessage::Reload { response } => {
                let _ = response.send(self.reload());
            }

            LedgerMessage::HasVoted { voter, response } => {
                let _ = response.send(self.chain.has_voted(&voter));
            }

            LedgerMessage::Tally { response } => {
                let _ = response.send(self.chain.tally());
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in main loop
            }
        }
    }

    fn cast_vote(&mut self, voter: VoterId, candidate: CandidateId) -> Result<LedgerEntry> {
        if self.chain.has_voted(&voter) {
            tracing::warn!(voter = %voter, "Duplicate vote rejected");
            return Err(Error::DuplicateVote(voter.to_string()));
        }

        let mut payload = Payload::new();
        payload.insert(
            VOTER_ID_FIELD.to_string(),
            serde_json::Value::String(voter.to_string()),
        );
        payload.insert(
            CANDIDATE_ID_FIELD.to_string(),
            serde_json::Value::String(candidate.to_string()),
        );
        payload.insert(
            CAST_AT_FIELD.to_string(),
            serde_json::Value::String(crypto::format_timestamp(&Utc::now())),
        );

        let entry = self.chain.append(payload).clone();
        tracing::info!(index = entry.index, voter = %voter, "Vote recorded");
        Ok(entry)
    }

    fn validate(&self) -> ChainStatus {
        if self.validation.verify_digests {
            self.chain.validate()
        } else {
            self.chain.validate_links_only()
        }
    }

    fn reload(&mut self) -> Result<ChainStatus> {
        let loaded = self.store.load_chain()?;
        if loaded.is_empty() {
            // A missing chain must never silently read as a fresh ledger
            return Err(Error::EmptyStore);
        }

        self.chain.replace(loaded)?;
        let status = self.validate();

        tracing::info!(entries = self.chain.len(), valid = status.is_valid(), "Chain reloaded");
        Ok(status)
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T, F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Append an entry
    pub async fn append(&self, payload: Payload) -> Result<LedgerEntry> {
        self.request(|response| LedgerMessage::Append { payload, response })
            .await?
    }

    /// Cast a vote, enforcing one vote per voter
    pub async fn cast_vote(&self, voter: VoterId, candidate: CandidateId) -> Result<LedgerEntry> {
        self.request(|response| LedgerMessage::CastVote {
            voter,
            candidate,
            response,
        })
        .await?
    }

    /// Get the latest entry
    pub async fn latest(&self) -> Result<LedgerEntry> {
        self.request(|response| LedgerMessage::Latest { response })
            .await
    }

    /// Get all entries
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.request(|response| LedgerMessage::Entries { response })
            .await
    }

    /// Validate the chain
    pub async fn validate(&self) -> Result<ChainStatus> {
        self.request(|response| LedgerMessage::Validate { response })
            .await
    }

    /// Persist the chain
    pub async fn save(&self) -> Result<()> {
        self.request(|response| LedgerMessage::Save { response })
            .await?
    }

    /// Reload the chain from the store
    pub async fn reload(&self) -> Result<ChainStatus> {
        self.request(|response| LedgerMessage::Reload { response })
            .await?
    }

    /// Whether a voter already cast a vote
    pub async fn has_voted(&self, voter: VoterId) -> Result<bool> {
        self.request(|response| LedgerMessage::HasVoted { voter, response })
            .await
    }

    /// Vote counts per candidate
    pub async fn tally(&self) -> Result<BTreeMap<CandidateId, u64>> {
        self.request(|response| LedgerMessage::Tally { response })
            .await
    }

    /// Shutdown actor and wait until its store handle is released
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(
    chain: Chain,
    store: Arc<LedgerStore>,
    validation: ValidationConfig,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(1000); // Bounded channel for backpressure
    let actor = LedgerActor::new(chain, store, validation, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
