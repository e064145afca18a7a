//! Error types for embedding matching

use thiserror::Error;

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Matching errors
///
/// Fatal to the single check that raised them, not to the caller's broader
/// flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// The two embeddings have different lengths; components are never
    /// silently truncated
    #[error("dimension mismatch: candidate has {candidate} components, stored embedding has {stored}")]
    DimensionMismatch {
        /// Candidate embedding length
        candidate: usize,
        /// Stored embedding length
        stored: usize,
    },
}
