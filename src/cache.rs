//! "Already built" predicates for skip-if-processed.
//!
//! The pipeline asks a [`BuildCache`] whether a source file still needs
//! processing. `--force` bypasses the cache entirely.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::collection::read_chunk_file;
use crate::export::OutputLayout;
use crate::models::DocumentRecord;
use crate::scan::SourceFile;

/// Configured cache strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// A chunk file for the document exists.
    #[default]
    Exists,
    /// The recorded SHA-256 of the source bytes matches the current file.
    Hash,
}

pub trait BuildCache {
    fn is_built(&self, source: &SourceFile) -> bool;
}

/// Built when `chunks/<stem>_chunks.json` exists.
pub struct ChunkFileExists {
    layout: OutputLayout,
}

impl ChunkFileExists {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }
}

impl BuildCache for ChunkFileExists {
    fn is_built(&self, source: &SourceFile) -> bool {
        self.layout.chunks_path(&source.stem).exists()
    }
}

/// Built when the document record's `source_sha256` matches the file on
/// disk and its chunk file still parses.
pub struct ContentHash {
    layout: OutputLayout,
}

impl ContentHash {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }

    fn recorded_hash(&self, stem: &str) -> Option<String> {
        let content = std::fs::read_to_string(self.layout.record_path(stem)).ok()?;
        let record: DocumentRecord = serde_json::from_str(&content).ok()?;
        record.source_sha256
    }
}

impl BuildCache for ContentHash {
    fn is_built(&self, source: &SourceFile) -> bool {
        let Some(recorded) = self.recorded_hash(&source.stem) else {
            return false;
        };
        let Ok(bytes) = std::fs::read(&source.path) else {
            return false;
        };
        recorded == sha256_hex(&bytes)
            && read_chunk_file(&self.layout.chunks_path(&source.stem)).is_ok()
    }
}

/// Build the cache for a configured mode.
pub fn for_mode(mode: CacheMode, layout: OutputLayout) -> Box<dyn BuildCache> {
    match mode {
        CacheMode::Exists => Box::new(ChunkFileExists::new(layout)),
        CacheMode::Hash => Box::new(ContentHash::new(layout)),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
