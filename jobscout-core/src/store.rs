//! Durable vector index with hash-gated incremental updates.
//!
//! The index maps posting ids to their embedding vectors together with a
//! fingerprint of the text each vector was computed from. Persisting the
//! index across runs means unchanged postings are never re-embedded; a
//! changed description shows up as a hash mismatch and only that posting
//! is recomputed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access index file: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted index exists but cannot be decoded. Recoverable:
    /// callers rebuild from an empty index, after which every posting
    /// needs embedding again.
    #[error("Index file is corrupted: {0}")]
    Corruption(String),

    #[error("Failed to encode index: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A stored posting vector and the fingerprint of the text it came from.
///
/// Invariant: `embedding` was computed from exactly the text whose SHA-256
/// hex digest is `content_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub embedding: Vec<f32>,
    pub content_hash: String,
}

/// An insertion-ordered vector index holding at most one entry per posting id.
///
/// Lookups are linear scans, which is fine at the few-thousand-postings
/// scale this pipeline works at. Iteration order is insertion order, which
/// keeps runs reproducible in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index from disk.
    ///
    /// A missing file yields an empty index. A file that exists but cannot
    /// be decoded yields [`StoreError::Corruption`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| StoreError::Corruption(e.to_string()))
    }

    /// Persists the index to disk.
    ///
    /// Writes to a sibling temporary file first and renames it into place,
    /// so an interrupted write cannot clobber the previous generation.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(self).map_err(StoreError::Encode)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Inserts or replaces the entry for `id`.
    ///
    /// A no-op when an entry for `id` already stores the same content hash;
    /// otherwise the vector and hash are overwritten in place. The index
    /// never holds two entries for the same id.
    pub fn upsert(
        &mut self,
        id: impl Into<String>,
        embedding: Vec<f32>,
        content_hash: impl Into<String>,
    ) {
        let id = id.into();
        let content_hash = content_hash.into();

        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                if entry.content_hash != content_hash {
                    entry.embedding = embedding;
                    entry.content_hash = content_hash;
                }
            }
            None => self.entries.push(IndexEntry {
                id,
                embedding,
                content_hash,
            }),
        }
    }

    /// True if `id` has no entry or its stored hash differs from
    /// `content_hash`, meaning the posting text changed and the vector
    /// must be recomputed.
    pub fn needs_embedding(&self, id: &str, content_hash: &str) -> bool {
        !self
            .entries
            .iter()
            .any(|e| e.id == id && e.content_hash == content_hash)
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hex SHA-256 fingerprint of the text an embedding is computed from.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
