//! Face embedding matching for VoteTrace
//!
//! Duplicate/identity checks over fixed-length face embeddings. Before a new
//! voter identity is enrolled or a vote-cast event is accepted, the candidate
//! embedding is compared against the previously stored ones; a near-duplicate
//! is rejected.
//!
//! This crate is stateless and does no I/O: the caller loads the comparison
//! set and awaits its own storage, then runs the check synchronously.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod embedding;
pub mod error;
pub mod matcher;

pub use embedding::{Embedding, EMBEDDING_DIM};
pub use error::{MatchError, Result};
pub use matcher::{euclidean_distance, is_duplicate, nearest, MATCH_THRESHOLD};
