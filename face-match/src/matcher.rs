//! Duplicate detection over face embeddings

use crate::embedding::Embedding;
use crate::error::{MatchError, Result};

/// Default distance below which two embeddings are considered the same face.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Euclidean (L2) distance between two equal-length embeddings.
pub fn euclidean_distance(a: &Embedding, b: &Embedding) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            candidate: a.len(),
            stored: b.len(),
        });
    }

    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();

    Ok(sum.sqrt())
}

/// Whether `candidate` is a near-duplicate of any stored embedding.
///
/// A stored embedding counts as a duplicate iff its distance is strictly
/// below `threshold`; a distance exactly at the threshold does not match.
pub fn is_duplicate(candidate: &Embedding, existing: &[Embedding], threshold: f64) -> Result<bool> {
    for stored in existing {
        let distance = euclidean_distance(candidate, stored)?;
        if distance < threshold {
            tracing::debug!(distance, threshold, "Duplicate embedding detected");
            return Ok(true);
        }
    }
    Ok(false)
}

/// The closest stored embedding, as `(index, distance)`.
///
/// Used to identify which enrolled voter a captured face belongs to; `None`
/// when the comparison set is empty.
pub fn nearest(candidate: &Embedding, existing: &[Embedding]) -> Result<Option<(usize, f64)>> {
    let mut best: Option<(usize, f64)> = None;
    for (index, stored) in existing.iter().enumerate() {
        let distance = euclidean_distance(candidate, stored)?;
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((index, distance)),
        }
    }
    Ok(best)
}
