//! Common types for ragkit-index.

use serde::{Deserialize, Serialize};

/// A single nearest-neighbour hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Row of the matching vector, which is also the position of its chunk text.
    pub row: usize,
    /// Similarity score (higher is more similar).
    pub score: f32,
}
