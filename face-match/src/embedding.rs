//! Face embedding type

use serde::{Deserialize, Serialize};

/// Components in a standard face descriptor as produced by the capture
/// pipeline.
pub const EMBEDDING_DIM: usize = 128;

/// A fixed-length numeric feature vector describing one face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f64>);

impl Embedding {
    /// Create from raw components
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the embedding has no components
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Components as a slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Embedding {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_is_a_plain_array() {
        let embedding = Embedding::new(vec![0.25, -0.5]);
        let json = serde_json::to_string(&embedding).unwrap();
        assert_eq!(json, "[0.25,-0.5]");

        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, embedding);
    }

    #[test]
    fn test_standard_descriptor_dim() {
        let embedding = Embedding::new(vec![0.0; EMBEDDING_DIM]);
        assert_eq!(embedding.len(), EMBEDDING_DIM);
        assert!(!embedding.is_empty());
    }
}
