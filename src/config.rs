use anyhow::{bail, Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::CacheMode;
use crate::chunk::{self, TotalChunks};
use crate::export::OutputLayout;
use crate::markdown::NumberedLists;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("pdfs")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("processed_docs")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["*.pdf".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    #[serde(default)]
    pub total_chunks: TotalChunks,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            total_chunks: TotalChunks::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MarkdownConfig {
    #[serde(default)]
    pub numbered_lists: NumberedLists,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CacheConfig {
    #[serde(default)]
    pub mode: CacheMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_name")]
    pub name: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_collection_name(),
        }
    }
}

fn default_collection_name() -> String {
    "Document Knowledge Base".to_string()
}

/// Starter config written by `docrag init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"[paths]
input_dir = "pdfs"
output_dir = "processed_docs"

[scan]
include_globs = ["*.pdf"]
exclude_globs = []

[chunking]
chunk_size = 1000
overlap = 100
# "estimate" keeps floor(len / stride) + 1; "exact" counts emitted chunks.
total_chunks = "estimate"

[markdown]
# "literal" recognizes only "1." and "2."; "enumerated" any "<digits>.".
numbered_lists = "literal"

[cache]
# "exists" skips files with a chunk file; "hash" compares source SHA-256.
mode = "exists"

[collection]
name = "Document Knowledge Base"
"#;

impl Config {
    /// Built-in defaults, used when no config file is present.
    pub fn minimal() -> Self {
        Self {
            paths: PathsConfig::default(),
            scan: ScanConfig::default(),
            chunking: ChunkingConfig::default(),
            markdown: MarkdownConfig::default(),
            cache: CacheConfig::default(),
            collection: CollectionConfig::default(),
        }
    }

    /// Where processed artifacts are written.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.paths.output_dir)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        chunk::validate(self.chunking.chunk_size, self.chunking.overlap)
            .context("Invalid [chunking] section")?;

        if self.collection.name.trim().is_empty() {
            bail!("collection.name must not be empty");
        }

        if self.scan.include_globs.is_empty() {
            bail!("scan.include_globs must list at least one pattern");
        }
        for pattern in self.scan.include_globs.iter().chain(&self.scan.exclude_globs) {
            Glob::new(pattern).with_context(|| format!("Invalid glob pattern: '{}'", pattern))?;
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = parse_config(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.overlap, 100);
        assert_eq!(config.chunking.total_chunks, TotalChunks::Estimate);
        assert_eq!(config.markdown.numbered_lists, NumberedLists::Literal);
        assert_eq!(config.cache.mode, CacheMode::Exists);
        assert_eq!(config.collection.name, "Document Knowledge Base");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.paths.input_dir, PathBuf::from("pdfs"));
        assert_eq!(
            config.layout().chunks_dir(),
            PathBuf::from("processed_docs/chunks")
        );
        assert_eq!(config.scan.include_globs, vec!["*.pdf".to_string()]);
    }

    #[test]
    fn test_overrides() {
        let config = parse_config(
            r#"
[chunking]
chunk_size = 500
overlap = 50
total_chunks = "exact"

[markdown]
numbered_lists = "enumerated"

[cache]
mode = "hash"
"#,
        )
        .unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.total_chunks, TotalChunks::Exact);
        assert_eq!(config.markdown.numbered_lists, NumberedLists::Enumerated);
        assert_eq!(config.cache.mode, CacheMode::Hash);
    }

    #[test]
    fn test_rejects_overlap_at_least_chunk_size() {
        let err = parse_config("[chunking]\nchunk_size = 100\noverlap = 100\n").unwrap_err();
        assert!(format!("{:#}", err).contains("must be greater than overlap"));
    }

    #[test]
    fn test_rejects_empty_collection_name() {
        assert!(parse_config("[collection]\nname = \"  \"\n").is_err());
    }

    #[test]
    fn test_rejects_bad_glob() {
        assert!(parse_config("[scan]\ninclude_globs = [\"[\"]\n").is_err());
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        assert!(parse_config("[chunking]\ntotal_chunks = \"maybe\"\n").is_err());
    }
}
