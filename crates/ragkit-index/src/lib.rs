//! # ragkit-index
//!
//! Exact nearest-neighbour search over unit-length embeddings, persisted
//! together with the chunk texts the embeddings were computed from.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ragkit_index::{DistanceMetric, FlatIndex, IndexStore};
//!
//! let mut index = FlatIndex::new(384, DistanceMetric::DotProduct)?;
//! index.add_batch(&embeddings)?;
//! IndexStore::save(dir, &index, &chunks, "all-MiniLM-L6-v2").await?;
//!
//! let stored = IndexStore::load(dir).await?;
//! let hits = stored.index.search(&query, 5)?;
//! let best = &stored.texts[hits[0].row];
//! ```
//!
//! ## Row alignment
//!
//! Row `i` of a [`FlatIndex`] corresponds to chunk `i` of the text list it was
//! saved with. [`IndexStore`] only ever writes and reads the two together and
//! verifies a checksum of the texts on load.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod index;
pub mod persistence;
pub mod types;

pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use index::FlatIndex;
pub use persistence::{IndexStore, StoredIndex, INDEX_FILE, TEXTS_FILE};
pub use types::SearchHit;
