//! Knowledge collection assembly.
//!
//! Gathers every persisted chunk file, regroups the chunks by their own
//! `metadata.source`, and re-identifies them into a [`Collection`] ready for
//! bulk import into Open WebUI. IDs are fresh UUIDs on every run.
//!
//! [`assemble`] is pure. [`load_chunk_sets`] and [`write_collection`] are the
//! filesystem edges around it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{DocragError, Result};
use crate::models::{Chunk, ChunkMetadata, Collection, CollectionChunk, CollectionDocument};

/// Suffix of per-document chunk files inside the chunks directory.
pub const CHUNK_FILE_SUFFIX: &str = "_chunks.json";
/// File name of the collection JSON inside the collection directory.
pub const COLLECTION_FILE: &str = "knowledge_collection.json";

/// Build a collection from chunk sets keyed by the file they were read from.
///
/// Grouping uses each chunk's `metadata.source`, not the set key, so two
/// files naming the same source merge into one document. Documents appear
/// in first-seen order; chunk metadata is renumbered within each document.
pub fn assemble<I>(chunk_sets: I, collection_name: &str) -> Result<Collection>
where
    I: IntoIterator<Item = (String, Vec<Chunk>)>,
{
    let mut order: Vec<(String, Vec<Chunk>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (set_name, chunks) in chunk_sets {
        for chunk in chunks {
            let source = chunk.metadata.source.clone();
            if source.is_empty() {
                return Err(DocragError::invalid_chunk(format!(
                    "chunk {} in {} has no metadata.source",
                    chunk.metadata.chunk_index, set_name
                )));
            }
            let slot = *index.entry(source.clone()).or_insert_with(|| {
                order.push((source, Vec::new()));
                order.len() - 1
            });
            order[slot].1.push(chunk);
        }
    }

    let documents = order
        .into_iter()
        .map(|(source, chunks)| build_document(source, chunks))
        .collect();

    Ok(Collection {
        name: collection_name.to_string(),
        documents,
    })
}

fn build_document(source: String, chunks: Vec<Chunk>) -> CollectionDocument {
    let doc_id = Uuid::new_v4();
    let total = chunks.len();
    let content_chunks = chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| CollectionChunk {
            id: Uuid::new_v4(),
            doc_id,
            content: chunk.text,
            metadata: ChunkMetadata {
                source: source.clone(),
                chunk_index: i,
                total_chunks: total,
            },
        })
        .collect();

    CollectionDocument {
        id: doc_id,
        url: String::new(),
        title: source,
        content_chunks,
    }
}

/// Read every `*_chunks.json` file in `chunks_dir`, sorted by file name.
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn load_chunk_sets(chunks_dir: &Path) -> Result<Vec<(String, Vec<Chunk>)>> {
    if !chunks_dir.exists() {
        return Ok(Vec::new());
    }

    let mut sets = Vec::new();
    let walker = WalkDir::new(chunks_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(chunks_dir).to_path_buf();
            DocragError::io(path, e.into())
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !entry.file_type().is_file() || !name.ends_with(CHUNK_FILE_SUFFIX) {
            continue;
        }

        match read_chunk_file(entry.path()) {
            Ok(chunks) => {
                tracing::info!(file = %name, chunks = chunks.len(), "loaded chunk file");
                sets.push((name, chunks));
            }
            Err(e) => tracing::warn!(file = %name, error = %e, "skipping unreadable chunk file"),
        }
    }

    Ok(sets)
}

/// Parse one chunk file.
pub fn read_chunk_file(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path).map_err(|e| DocragError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| DocragError::json(path, e))
}

/// Paths written by [`write_collection`].
#[derive(Debug, Clone)]
pub struct CollectionOutput {
    pub json_path: PathBuf,
    pub instructions_path: PathBuf,
}

/// Write the collection JSON and its sibling import instructions.
pub fn write_collection(dir: &Path, collection: &Collection) -> Result<CollectionOutput> {
    std::fs::create_dir_all(dir).map_err(|e| DocragError::io(dir, e))?;

    let json_path = dir.join(COLLECTION_FILE);
    let json =
        serde_json::to_string_pretty(collection).map_err(|e| DocragError::json(&json_path, e))?;
    std::fs::write(&json_path, json).map_err(|e| DocragError::io(&json_path, e))?;

    let stem = json_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "knowledge_collection".to_string());
    let instructions_path = dir.join(format!("{}_import_instructions.txt", stem));
    std::fs::write(
        &instructions_path,
        import_instructions(&collection.name, &json_path),
    )
    .map_err(|e| DocragError::io(&instructions_path, e))?;

    Ok(CollectionOutput {
        json_path,
        instructions_path,
    })
}

/// Human-readable steps for importing the collection file.
pub fn import_instructions(collection_name: &str, json_path: &Path) -> String {
    format!(
        "\nOpen WebUI Collection Created: {name}\n\
         \n\
         To import this collection into Open WebUI:\n\
         \n\
         1. Open the Open WebUI interface\n\
         2. Go to Collections\n\
         3. Click \"Import Collection\"\n\
         4. Select the file: {path}\n\
         5. Verify the import was successful\n\
         \n\
         You can now use this collection in your RAG workflows in Open WebUI.\n",
        name = collection_name,
        path = json_path.display()
    )
}
