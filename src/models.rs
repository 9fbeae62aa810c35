//! Core data models that flow through the processing pipeline.
//!
//! [`Chunk`] is what the chunker emits and what lands in the per-document
//! chunk files. [`Collection`] is the consolidated import artifact built by
//! [`crate::collection::assemble`]. [`DocumentRecord`] is the per-document
//! JSON summary written next to the text and markdown outputs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Positional metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document file name. Defaults to empty when absent on disk so
    /// the assembler can report it instead of failing the whole load.
    #[serde(default)]
    pub source: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A contiguous slice of a document's extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Consolidated knowledge collection for bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub documents: Vec<CollectionDocument>,
}

/// One source document inside a [`Collection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub id: Uuid,
    /// Always empty; the import format requires the key.
    #[serde(default)]
    pub url: String,
    pub title: String,
    pub content_chunks: Vec<CollectionChunk>,
}

/// A re-identified chunk inside a [`CollectionDocument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionChunk {
    pub id: Uuid,
    pub doc_id: Uuid,
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.documents.iter().map(|d| d.content_chunks.len()).sum()
    }
}

/// Per-document summary written to `docs/<stem>/<stem>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub title: String,
    pub source: String,
    pub pages: usize,
    pub processed_date: String,
    pub chunks_count: usize,
    pub full_text: String,
    /// SHA-256 of the source bytes, used by the content-hash build cache.
    #[serde(default)]
    pub source_sha256: Option<String>,
}
