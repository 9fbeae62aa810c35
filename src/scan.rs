//! Input folder scanning.
//!
//! Lists the source documents directly inside `paths.input_dir` that match
//! the configured include globs and none of the exclude globs, sorted by
//! file name for a stable processing order.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;

/// A source document found in the input folder.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name with extension, e.g. `report.pdf`. Used as chunk source.
    pub name: String,
    /// File name without extension, e.g. `report`. Names every output.
    pub stem: String,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

pub fn scan_inputs(config: &Config) -> Result<Vec<SourceFile>> {
    let root = &config.paths.input_dir;
    if !root.is_dir() {
        bail!("Input directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.scan.include_globs)?;
    let exclude_set = build_globset(&config.scan.exclude_globs)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if exclude_set.is_match(&name) || !include_set.is_match(&name) {
            continue;
        }

        files.push(source_file(entry.path(), name)?);
    }

    Ok(files)
}

fn source_file(path: &Path, name: String) -> Result<SourceFile> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("Cannot stat {}", path.display()))?;
    let modified = metadata
        .modified()
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.clone());

    Ok(SourceFile {
        path: path.to_path_buf(),
        name,
        stem,
        size_bytes: metadata.len(),
        modified: DateTime::<Local>::from(modified),
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(input: &Path) -> Config {
        let mut config = Config::minimal();
        config.paths.input_dir = input.to_path_buf();
        config
    }

    #[test]
    fn test_lists_matching_files_sorted() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("b.pdf"), b"b").unwrap();
        fs::write(tmp.path().join("a.pdf"), b"aa").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("nested.pdf")).unwrap();
        fs::write(tmp.path().join("nested.pdf").join("c.pdf"), b"c").unwrap();

        let files = scan_inputs(&config_for(tmp.path())).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
        assert_eq!(files[0].stem, "a");
        assert_eq!(files[0].size_bytes, 2);
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("keep.pdf"), b"k").unwrap();
        fs::write(tmp.path().join("draft-1.pdf"), b"d").unwrap();

        let mut config = config_for(tmp.path());
        config.scan.exclude_globs = vec!["draft-*".to_string()];
        let files = scan_inputs(&config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "keep.pdf");
    }

    #[test]
    fn test_missing_input_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = scan_inputs(&config_for(&tmp.path().join("absent"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
