//! Persistence layer for ragkit-index.
//!
//! An index directory always holds two artifacts that are written and read as
//! a pair:
//! - `{dir}/index.bin` - manifest and row-major vectors (postcard format)
//! - `{dir}/texts.json` - ordered chunk texts (JSON array of strings)
//!
//! The manifest records the row count and a SHA-256 over the chunk texts, so a
//! vector file paired with the wrong text file is rejected at load time instead
//! of attributing scores to the wrong chunk.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::FlatIndex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// File name of the vector artifact.
pub const INDEX_FILE: &str = "index.bin";
/// File name of the chunk-text artifact.
pub const TEXTS_FILE: &str = "texts.json";

const FORMAT_VERSION: u32 = 1;
const TMP_SUFFIX: &str = "tmp";
const BACKUP_SUFFIX: &str = "bak";

/// Manifest as written (borrows the index storage).
#[derive(Serialize)]
struct ManifestRef<'a> {
    format_version: u32,
    metric: DistanceMetric,
    dimensions: usize,
    rows: usize,
    embedder_id: &'a str,
    texts_sha256: String,
    vectors: &'a [f32],
}

/// Manifest as read back.
#[derive(Deserialize)]
struct Manifest {
    format_version: u32,
    metric: DistanceMetric,
    dimensions: usize,
    rows: usize,
    embedder_id: String,
    texts_sha256: String,
    vectors: Vec<f32>,
}

/// An index and its chunk texts, loaded together.
#[derive(Debug, Clone)]
pub struct StoredIndex {
    /// The vector index. Row `i` belongs to `texts[i]`.
    pub index: FlatIndex,
    /// Chunk texts in row order.
    pub texts: Vec<String>,
    /// Identifier of the embedding model that produced the vectors.
    pub embedder_id: String,
}

impl StoredIndex {
    /// Fail if the stored vectors do not have the active embedder's dimension.
    pub fn ensure_dimensions(&self, expected: usize) -> Result<()> {
        if self.index.dimensions() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: self.index.dimensions(),
            });
        }
        Ok(())
    }

    /// Fail if the vectors were produced by a model other than `expected`.
    ///
    /// Two embedders can share a dimension yet place text in unrelated spaces,
    /// so the dimension check alone does not make scores meaningful.
    pub fn ensure_embedder(&self, expected: &str) -> Result<()> {
        if self.embedder_id != expected {
            return Err(Error::EmbedderMismatch {
                expected: expected.to_string(),
                actual: self.embedder_id.clone(),
            });
        }
        Ok(())
    }
}

/// Reads and writes index directories.
pub struct IndexStore;

impl IndexStore {
    /// Path of the vector artifact inside `dir`.
    pub fn index_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Path of the chunk-text artifact inside `dir`.
    pub fn texts_path(dir: &Path) -> PathBuf {
        dir.join(TEXTS_FILE)
    }

    /// True when both artifacts are present.
    pub fn exists(dir: &Path) -> bool {
        Self::index_path(dir).exists() && Self::texts_path(dir).exists()
    }

    /// Write `index` and `texts` to `dir`, replacing any previous pair.
    ///
    /// Both artifacts are staged next to their final names and renamed into
    /// place only once both are on disk. If staging or either rename fails the
    /// previous pair is left in place.
    pub async fn save(dir: &Path, index: &FlatIndex, texts: &[String], embedder_id: &str) -> Result<()> {
        if index.len() != texts.len() {
            return Err(Error::Misaligned(format!(
                "{} vectors but {} chunk texts",
                index.len(),
                texts.len()
            )));
        }

        tokio::fs::create_dir_all(dir).await?;

        let manifest = ManifestRef {
            format_version: FORMAT_VERSION,
            metric: index.metric(),
            dimensions: index.dimensions(),
            rows: index.len(),
            embedder_id,
            texts_sha256: texts_checksum(texts),
            vectors: index.raw(),
        };
        let index_bytes = postcard::to_allocvec(&manifest)
            .map_err(|e| Error::Persistence(format!("Failed to serialize index: {}", e)))?;
        let texts_bytes = serde_json::to_vec(texts)
            .map_err(|e| Error::Persistence(format!("Failed to serialize chunk texts: {}", e)))?;

        let index_path = Self::index_path(dir);
        let texts_path = Self::texts_path(dir);
        let index_tmp = index_path.with_extension(format!("bin.{}", TMP_SUFFIX));
        let texts_tmp = texts_path.with_extension(format!("json.{}", TMP_SUFFIX));

        let staged = async {
            write_synced(&texts_tmp, &texts_bytes).await?;
            write_synced(&index_tmp, &index_bytes).await
        }
        .await;

        if let Err(e) = staged {
            warn!(path = ?dir, error = %e, "Failed to stage index, previous index kept");
            discard(&texts_tmp).await;
            discard(&index_tmp).await;
            return Err(e);
        }

        if let Err(e) = commit(&texts_tmp, &texts_path, &index_tmp, &index_path).await {
            warn!(path = ?dir, error = %e, "Failed to commit index, previous index kept");
            discard(&texts_tmp).await;
            discard(&index_tmp).await;
            return Err(e);
        }

        info!(
            path = ?dir,
            rows = index.len(),
            dimensions = index.dimensions(),
            bytes = index_bytes.len() + texts_bytes.len(),
            "Saved index"
        );
        Ok(())
    }

    /// Load the index and chunk texts stored in `dir`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexNotFound`] if either artifact is missing.
    /// - [`Error::Misaligned`] if row counts or the text checksum disagree.
    /// - [`Error::Persistence`] if an artifact cannot be decoded.
    pub async fn load(dir: &Path) -> Result<StoredIndex> {
        let index_path = Self::index_path(dir);
        let texts_path = Self::texts_path(dir);

        if !index_path.exists() || !texts_path.exists() {
            debug!(
                index = index_path.exists(),
                texts = texts_path.exists(),
                "Index artifacts incomplete"
            );
            return Err(Error::IndexNotFound(dir.to_path_buf()));
        }

        let index_bytes = tokio::fs::read(&index_path).await?;
        let manifest: Manifest = postcard::from_bytes(&index_bytes)
            .map_err(|e| Error::Persistence(format!("Failed to decode {}: {}", INDEX_FILE, e)))?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "Unsupported index format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            )));
        }

        let texts_bytes = tokio::fs::read(&texts_path).await?;
        let texts: Vec<String> = serde_json::from_slice(&texts_bytes)
            .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", TEXTS_FILE, e)))?;

        if manifest.rows != texts.len() {
            return Err(Error::Misaligned(format!(
                "index has {} rows but {} lists {} chunks",
                manifest.rows,
                TEXTS_FILE,
                texts.len()
            )));
        }
        if texts_checksum(&texts) != manifest.texts_sha256 {
            return Err(Error::Misaligned(format!(
                "{} does not match the texts the index was built from",
                TEXTS_FILE
            )));
        }

        let index = FlatIndex::from_raw(manifest.dimensions, manifest.metric, manifest.vectors)?;
        if index.len() != manifest.rows {
            return Err(Error::Misaligned(format!(
                "manifest declares {} rows but holds {} vectors",
                manifest.rows,
                index.len()
            )));
        }

        info!(
            path = ?dir,
            rows = index.len(),
            dimensions = index.dimensions(),
            embedder = %manifest.embedder_id,
            "Loaded index"
        );

        Ok(StoredIndex {
            index,
            texts,
            embedder_id: manifest.embedder_id,
        })
    }
}

/// SHA-256 over length-prefixed chunk texts, hex encoded.
fn texts_checksum(texts: &[String]) -> String {
    let mut hasher = Sha256::new();
    for text in texts {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Rename both staged artifacts into place.
///
/// The current text file is moved aside first and put back if either rename
/// fails, so the directory never pairs new texts with old vectors.
async fn commit(texts_tmp: &Path, texts_path: &Path, index_tmp: &Path, index_path: &Path) -> Result<()> {
    let backup = texts_path.with_extension(format!("json.{}", BACKUP_SUFFIX));
    let had_previous = texts_path.exists();
    if had_previous {
        tokio::fs::rename(texts_path, &backup).await?;
    }

    let renamed = async {
        tokio::fs::rename(texts_tmp, texts_path).await?;
        tokio::fs::rename(index_tmp, index_path).await
    }
    .await;

    match renamed {
        Ok(()) => {
            discard(&backup).await;
            Ok(())
        }
        Err(e) => {
            if had_previous {
                if let Err(restore) = tokio::fs::rename(&backup, texts_path).await {
                    warn!(path = ?texts_path, error = %restore, "Failed to restore previous chunk texts");
                }
            } else {
                discard(texts_path).await;
            }
            Err(e.into())
        }
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

async fn discard(path: &Path) {
    if path.exists() {
        let _ = tokio::fs::remove_file(path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> (FlatIndex, Vec<String>) {
        let mut index = FlatIndex::new(2, DistanceMetric::DotProduct).unwrap();
        index.add_batch(&[[1.0f32, 0.0], [0.0, 1.0]]).unwrap();
        let texts = vec!["first chunk".to_string(), "zweiter Abschnitt – ü".to_string()];
        (index, texts)
    }

    #[tokio::test]
    async fn test_save_load_pair() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();

        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();
        assert!(IndexStore::exists(temp_dir.path()));

        let loaded = IndexStore::load(temp_dir.path()).await.unwrap();
        assert_eq!(loaded.index, index);
        assert_eq!(loaded.texts, texts);
        assert_eq!(loaded.embedder_id, "hash-2");
    }

    #[tokio::test]
    async fn test_texts_file_is_plain_json() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        let raw = std::fs::read_to_string(IndexStore::texts_path(temp_dir.path())).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, texts);
        assert!(raw.contains('ü'));
    }

    #[tokio::test]
    async fn test_missing_either_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        std::fs::remove_file(IndexStore::texts_path(temp_dir.path())).unwrap();
        let err = IndexStore::load(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));

        let empty = TempDir::new().unwrap();
        let err = IndexStore::load(empty.path()).await.unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn test_swapped_texts_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        let reversed: Vec<String> = texts.iter().rev().cloned().collect();
        std::fs::write(
            IndexStore::texts_path(temp_dir.path()),
            serde_json::to_vec(&reversed).unwrap(),
        )
        .unwrap();

        let err = IndexStore::load(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Misaligned(_)));
    }

    #[tokio::test]
    async fn test_row_count_mismatch_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        std::fs::write(
            IndexStore::texts_path(temp_dir.path()),
            serde_json::to_vec(&texts[..1]).unwrap(),
        )
        .unwrap();

        let err = IndexStore::load(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Misaligned(_)));
    }

    #[tokio::test]
    async fn test_save_rejects_misaligned_input() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();

        let err = IndexStore::save(temp_dir.path(), &index, &texts[..1], "hash-2")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Misaligned(_)));
        assert!(!IndexStore::exists(temp_dir.path()));
    }

    #[tokio::test]
    async fn test_rebuild_replaces_both_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        let mut smaller = FlatIndex::new(2, DistanceMetric::DotProduct).unwrap();
        smaller.add(&[0.6, 0.8]).unwrap();
        let new_texts = vec!["only chunk".to_string()];
        IndexStore::save(temp_dir.path(), &smaller, &new_texts, "hash-2")
            .await
            .unwrap();

        let loaded = IndexStore::load(temp_dir.path()).await.unwrap();
        assert_eq!(loaded.index.len(), 1);
        assert_eq!(loaded.texts, new_texts);
        assert!(!temp_dir.path().join("index.bin.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_vector_rename_keeps_previous_pair() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let (index, texts) = sample();
        IndexStore::save(dir, &index, &texts, "hash-2").await.unwrap();

        let texts_tmp = dir.join("texts.json.tmp");
        std::fs::write(&texts_tmp, serde_json::to_vec(&["replacement"]).unwrap()).unwrap();
        let missing_index_tmp = dir.join("index.bin.tmp");

        let result = commit(
            &texts_tmp,
            &IndexStore::texts_path(dir),
            &missing_index_tmp,
            &IndexStore::index_path(dir),
        )
        .await;
        assert!(result.is_err());

        let loaded = IndexStore::load(dir).await.unwrap();
        assert_eq!(loaded.texts, texts);
        assert!(!dir.join("texts.json.bak").exists());
    }

    #[tokio::test]
    async fn test_failed_first_commit_leaves_no_texts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let texts_tmp = dir.join("texts.json.tmp");
        std::fs::write(&texts_tmp, b"[]").unwrap();

        let result = commit(
            &texts_tmp,
            &IndexStore::texts_path(dir),
            &dir.join("index.bin.tmp"),
            &IndexStore::index_path(dir),
        )
        .await;
        assert!(result.is_err());
        assert!(!IndexStore::texts_path(dir).exists());
    }

    #[tokio::test]
    async fn test_save_over_blocked_index_path_restores_texts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let (index, texts) = sample();
        IndexStore::save(dir, &index, &texts, "hash-2").await.unwrap();
        let previous_texts = std::fs::read(IndexStore::texts_path(dir)).unwrap();

        // A non-empty directory at the vector path makes its rename fail.
        let index_path = IndexStore::index_path(dir);
        std::fs::remove_file(&index_path).unwrap();
        std::fs::create_dir(&index_path).unwrap();
        std::fs::write(index_path.join("occupied"), b"x").unwrap();

        let mut smaller = FlatIndex::new(2, DistanceMetric::DotProduct).unwrap();
        smaller.add(&[0.6, 0.8]).unwrap();
        let result = IndexStore::save(dir, &smaller, &["only chunk".to_string()], "hash-2").await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(IndexStore::texts_path(dir)).unwrap(), previous_texts);
        assert!(!dir.join("texts.json.tmp").exists());
        assert!(!dir.join("index.bin.tmp").exists());
    }

    #[tokio::test]
    async fn test_ensure_embedder() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        let loaded = IndexStore::load(temp_dir.path()).await.unwrap();
        assert!(loaded.ensure_embedder("hash-2").is_ok());
        assert!(matches!(
            loaded.ensure_embedder("bge-small-en-v1.5"),
            Err(Error::EmbedderMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_ensure_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let (index, texts) = sample();
        IndexStore::save(temp_dir.path(), &index, &texts, "hash-2")
            .await
            .unwrap();

        let loaded = IndexStore::load(temp_dir.path()).await.unwrap();
        assert!(loaded.ensure_dimensions(2).is_ok());
        assert!(matches!(
            loaded.ensure_dimensions(384),
            Err(Error::DimensionMismatch {
                expected: 384,
                actual: 2
            })
        ));
    }
}
