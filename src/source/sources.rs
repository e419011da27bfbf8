//! Record source implementations

use super::types::{Entry, RecordSource};
use crate::error::{Error, Result, ResultExt};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// In-Memory Source
// ============================================================================

/// In-process append-only source
///
/// Clones share the same underlying entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl MemorySource {
    /// Create a source seeded with entries
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Append one entry
    pub async fn append(&self, entry: Entry) {
        self.entries.write().await.push(entry);
    }

    /// Append many entries
    pub async fn extend(&self, entries: impl IntoIterator<Item = Entry>) {
        self.entries.write().await.extend(entries);
    }

    /// Number of entries currently stored
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the source is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn entries(&self) -> Result<Vec<Entry>> {
        Ok(self.entries.read().await.clone())
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Source backed by a file of entries
///
/// Accepts either a JSON array of entries or JSON Lines (one entry per line).
/// The file is re-read on every call, so appends to it are picked up.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create a source for the given file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for JsonFileSource {
    async fn entries(&self) -> Result<Vec<Entry>> {
        if !self.path.exists() {
            return Err(Error::FileNotFound {
                path: self.path.display().to_string(),
            });
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;
        parse_entries(&contents)
    }
}

/// Parse a JSON array or JSON Lines document into entries
pub(crate) fn parse_entries(contents: &str) -> Result<Vec<Entry>> {
    let trimmed = contents.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    contents
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<Entry>(line)
                .with_context(|| format!("JSON Lines entry at line {n}"))
        })
        .collect()
}
