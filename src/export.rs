//! Per-document output files.
//!
//! [`OutputLayout`] is the single place that knows where each artifact of a
//! processed document lives under the output directory:
//!
//! ```text
//! <output_dir>/
//!   docs/<stem>/<stem>.txt     full extracted text
//!   docs/<stem>/<stem>.md      reconstructed markdown
//!   docs/<stem>/<stem>.json    DocumentRecord
//!   chunks/<stem>_chunks.json  JSON array of chunks
//!   jsonl/<stem>.jsonl         one chunk per line
//!   collection/                knowledge collection + instructions
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::collection::CHUNK_FILE_SUFFIX;
use crate::error::{DocragError, Result};
use crate::models::{Chunk, DocumentRecord};

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: output_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join("docs")
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join("chunks")
    }

    pub fn jsonl_dir(&self) -> PathBuf {
        self.root.join("jsonl")
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.root.join("collection")
    }

    pub fn doc_dir(&self, stem: &str) -> PathBuf {
        self.docs_dir().join(stem)
    }

    pub fn text_path(&self, stem: &str) -> PathBuf {
        self.doc_dir(stem).join(format!("{}.txt", stem))
    }

    pub fn markdown_path(&self, stem: &str) -> PathBuf {
        self.doc_dir(stem).join(format!("{}.md", stem))
    }

    pub fn record_path(&self, stem: &str) -> PathBuf {
        self.doc_dir(stem).join(format!("{}.json", stem))
    }

    pub fn chunks_path(&self, stem: &str) -> PathBuf {
        self.chunks_dir()
            .join(format!("{}{}", stem, CHUNK_FILE_SUFFIX))
    }

    pub fn jsonl_path(&self, stem: &str) -> PathBuf {
        self.jsonl_dir().join(format!("{}.jsonl", stem))
    }

    /// Create the shared output directories.
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [self.docs_dir(), self.chunks_dir(), self.jsonl_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| DocragError::io(&dir, e))?;
        }
        Ok(())
    }
}

/// Everything produced for one source document.
#[derive(Debug, Clone)]
pub struct DocumentOutputs<'a> {
    pub stem: &'a str,
    pub text: &'a str,
    pub markdown: &'a str,
    pub record: &'a DocumentRecord,
    pub chunks: &'a [Chunk],
}

/// Write all artifacts of one document, overwriting earlier runs.
///
/// The chunk file marks a document as built, so it is removed up front and
/// only committed (temp file + rename) once every other artifact is on disk.
/// A failure part way through leaves the document looking unprocessed.
pub fn write_document(layout: &OutputLayout, out: &DocumentOutputs<'_>) -> Result<()> {
    let chunks_path = layout.chunks_path(out.stem);
    remove_if_present(&chunks_path)?;

    let doc_dir = layout.doc_dir(out.stem);
    std::fs::create_dir_all(&doc_dir).map_err(|e| DocragError::io(&doc_dir, e))?;

    write_file(&layout.text_path(out.stem), out.text.as_bytes())?;
    write_file(&layout.markdown_path(out.stem), out.markdown.as_bytes())?;

    let record_path = layout.record_path(out.stem);
    let record =
        serde_json::to_string_pretty(out.record).map_err(|e| DocragError::json(&record_path, e))?;
    write_file(&record_path, record.as_bytes())?;

    write_jsonl(&layout.jsonl_path(out.stem), out.chunks)?;

    let chunks =
        serde_json::to_string_pretty(out.chunks).map_err(|e| DocragError::json(&chunks_path, e))?;
    let tmp_path = chunks_path.with_extension("json.tmp");
    write_file(&tmp_path, chunks.as_bytes())?;
    std::fs::rename(&tmp_path, &chunks_path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        DocragError::io(&chunks_path, e)
    })
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocragError::io(path, e)),
    }
}

/// Write one JSON-encoded chunk per line.
pub fn write_jsonl(path: &Path, chunks: &[Chunk]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocragError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| DocragError::io(path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    for chunk in chunks {
        let line = serde_json::to_string(chunk).map_err(|e| DocragError::json(path, e))?;
        writeln!(writer, "{}", line).map_err(|e| DocragError::io(path, e))?;
    }
    writer.flush().map_err(|e| DocragError::io(path, e))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DocragError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| DocragError::io(path, e))
}
