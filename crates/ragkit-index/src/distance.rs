//! Similarity metrics for the flat index.

use std::fmt;

/// Similarity metric used to score a query against stored rows.
///
/// Embeddings produced by ragkit are unit length, so [`DistanceMetric::DotProduct`]
/// and [`DistanceMetric::Cosine`] rank rows identically; the dot product skips
/// the norm computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum DistanceMetric {
    /// Inner product. Higher is more similar.
    #[default]
    DotProduct,

    /// Cosine similarity in [-1, 1].
    Cosine,
}

impl DistanceMetric {
    /// Compute the similarity score between two vectors (higher is more similar).
    #[inline]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::DotProduct => dot_product(a, b),
            DistanceMetric::Cosine => cosine_similarity(a, b),
        }
    }

    /// Get the name of this metric.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::DotProduct => "dot_product",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "dot_product" | "dotproduct" | "inner" | "ip" => Ok(DistanceMetric::DotProduct),
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}

/// Compute dot product between two vectors.
#[inline]
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;

    let chunks = a.len() / 4;
    let remainder = a.len() % 4;

    for i in 0..chunks {
        let base = i * 4;
        sum += a[base] * b[base]
            + a[base + 1] * b[base + 1]
            + a[base + 2] * b[base + 2]
            + a[base + 3] * b[base + 3];
    }

    let start = chunks * 4;
    for i in 0..remainder {
        let idx = start + i;
        sum += a[idx] * b[idx];
    }

    sum
}

#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product(a, b);
    let denom = (dot_product(a, a) * dot_product(b, b)).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
