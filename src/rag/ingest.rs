//! Raw document ingestion: `*.txt` tree → `<stem>.chunks.txt` artifacts.

use crate::rag::chunker::TextChunker;
use crate::types::{AppError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of processed chunk files.
pub const CHUNKS_SUFFIX: &str = ".chunks.txt";

/// Separator between chunks inside a processed file.
const CHUNK_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub chunks: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub files: Vec<IngestedFile>,
    /// Directory entries that could not be read (broken links, permissions, loops).
    pub skipped: usize,
}

impl IngestReport {
    pub fn total_chunks(&self) -> usize {
        self.files.iter().map(|f| f.chunks).sum()
    }
}

fn is_txt(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

/// Every `*.txt` under `raw_dir`, sorted by path, plus the count of entries
/// that could not be read. Unreadable entries are logged and skipped.
fn discover_sources(raw_dir: &Path) -> (Vec<PathBuf>, usize) {
    let mut files = Vec::new();
    let mut skipped = 0;

    for entry in WalkDir::new(raw_dir).follow_links(true) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_txt(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "Skipping unreadable entry");
                skipped += 1;
            }
        }
    }

    files.sort();
    (files, skipped)
}

/// Clean and chunk every text file under `raw_dir` into `processed_dir`.
///
/// Invalid UTF-8 is replaced rather than rejected. Files sharing a stem in
/// different subdirectories overwrite each other, last one in path order wins.
pub async fn ingest_dir(raw_dir: &Path, processed_dir: &Path, max_len: usize) -> Result<IngestReport> {
    let (sources, skipped) = discover_sources(raw_dir);
    if sources.is_empty() {
        return Err(AppError::NoInputFiles(raw_dir.display().to_string()));
    }

    tokio::fs::create_dir_all(processed_dir).await?;
    let chunker = TextChunker::new(max_len);
    let mut report = IngestReport {
        files: Vec::new(),
        skipped,
    };

    for source in sources {
        let bytes = tokio::fs::read(&source).await?;
        let text = String::from_utf8_lossy(&bytes);
        let chunks = chunker.chunk(&text);

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = processed_dir.join(format!("{stem}{CHUNKS_SUFFIX}"));
        tokio::fs::write(&output, chunks.join(CHUNK_SEPARATOR)).await?;

        info!(source = ?source, output = ?output, chunks = chunks.len(), "Ingested file");
        report.files.push(IngestedFile {
            source,
            output,
            chunks: chunks.len(),
        });
    }

    info!(
        files = report.files.len(),
        chunks = report.total_chunks(),
        skipped = report.skipped,
        max_len = chunker.max_len(),
        "Ingestion finished"
    );
    Ok(report)
}

/// Read every processed chunk file in `processed_dir`, sorted by file name.
///
/// A missing directory yields no chunks; the index builder reports that.
pub async fn load_processed_chunks(processed_dir: &Path) -> Result<Vec<String>> {
    if !processed_dir.is_dir() {
        debug!(dir = ?processed_dir, "Processed directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(processed_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(CHUNKS_SUFFIX));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut chunks = Vec::new();
    for path in files {
        let content = tokio::fs::read_to_string(&path).await?;
        chunks.extend(
            content
                .split(CHUNK_SEPARATOR)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        );
    }

    Ok(chunks)
}
