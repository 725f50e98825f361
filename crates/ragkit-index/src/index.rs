//! Exact (brute-force) inner-product index.
//!
//! Rows are stored contiguously in insertion order; row `i` is the `i`-th
//! vector added. Search scores every row, which is exact and fast enough for
//! the tens of thousands of chunks a single ingestion run produces.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::SearchHit;
use std::cmp::Ordering;
use tracing::trace;

/// Flat vector index with row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    metric: DistanceMetric,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVector`] if `dimensions` is zero.
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::InvalidVector("Dimensions must be > 0".to_string()));
        }

        Ok(Self {
            dimensions,
            metric,
            data: Vec::new(),
        })
    }

    /// Rebuild an index from raw row-major storage.
    pub(crate) fn from_raw(dimensions: usize, metric: DistanceMetric, data: Vec<f32>) -> Result<Self> {
        let index = Self::new(dimensions, metric)?;
        if data.len() % dimensions != 0 {
            return Err(Error::Persistence(format!(
                "Vector data length {} is not a multiple of {} dimensions",
                data.len(),
                dimensions
            )));
        }
        Ok(Self { data, ..index })
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the similarity metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of rows in the index.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    /// Check if the index has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major storage.
    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Get the vector stored at `row`.
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dimensions)?;
        self.data.get(start..start + self.dimensions)
    }

    /// Append a vector and return its row.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.validate(vector)?;
        let row = self.len();
        self.data.extend_from_slice(vector);
        Ok(row)
    }

    /// Append several vectors in order.
    ///
    /// Either every vector is added or none is.
    ///
    /// # Returns
    ///
    /// The number of vectors added.
    pub fn add_batch<V: AsRef<[f32]>>(&mut self, vectors: &[V]) -> Result<usize> {
        for vector in vectors {
            self.validate(vector.as_ref())?;
        }

        self.data.reserve(vectors.len() * self.dimensions);
        for vector in vectors {
            self.data.extend_from_slice(vector.as_ref());
        }
        Ok(vectors.len())
    }

    /// Return the `k` most similar rows, best first.
    ///
    /// Ties are broken by the lower row. `k` is clamped to the row count, so
    /// `k == 0` or an empty index yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.validate(query)?;

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(row, vector)| SearchHit {
                row,
                score: self.metric.similarity(query, vector),
            })
            .collect();

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, rank_order);
            hits.truncate(k);
        }
        hits.sort_by(rank_order);

        trace!(k, rows = self.len(), "Flat search completed");
        Ok(hits)
    }

    fn validate(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Vector contains NaN or Inf".to_string(),
            ));
        }

        Ok(())
    }
}

/// Descending score, then ascending row.
fn rank_order(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.row.cmp(&b.row))
}
