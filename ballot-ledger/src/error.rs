//! Error types for the ballot ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// A broken chain is deliberately NOT an error variant: validation returns a
/// structured [`ChainStatus`](crate::chain::ChainStatus), since tampering is
/// an expected, actionable outcome rather than a fault in the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (RocksDB unreachable or failing)
    #[error("storage error: {0}")]
    Store(String),

    /// The store holds no ledger entries where some were expected
    #[error("ledger store is empty")]
    EmptyStore,

    /// A persisted document is missing a field, has a wrong type, or does
    /// not belong at its key
    #[error("malformed record at key {key}: {reason}")]
    MalformedRecord {
        /// Document key within the store
        key: String,
        /// What was wrong with the document
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A voter attempted to cast a second vote
    #[error("voter {0} has already cast a vote")]
    DuplicateVote(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Store(err.to_string())
    }
}
