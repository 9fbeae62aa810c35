//! Per-file processing report.
//!
//! Collects what each run did to each input (processed, skipped, failed)
//! plus what currently sits in the output tree for it, and renders the
//! detailed summaries printed by `docrag process` and `docrag status`.

use std::fmt::{self, Write as _};
use std::io::{BufRead, BufReader};

use crate::collection::read_chunk_file;
use crate::export::OutputLayout;
use crate::scan::SourceFile;

const RULE_WIDTH: usize = 80;

/// Outcome of one input file in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Processed,
    Skipped,
    Error,
    /// Outputs already present (status command only).
    Built,
    /// Not yet processed (status command only).
    Pending,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileStatus::Processed => "processed",
            FileStatus::Skipped => "skipped",
            FileStatus::Error => "error",
            FileStatus::Built => "built",
            FileStatus::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// What the output tree holds for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedInfo {
    pub chunks_count: Option<usize>,
    pub text_size_bytes: Option<u64>,
    pub text_lines: Option<usize>,
    pub json_size_bytes: Option<u64>,
    pub markdown_size_bytes: Option<u64>,
    pub jsonl_size_bytes: Option<u64>,
}

impl ProcessedInfo {
    /// Inspect the artifacts for `stem`; missing files leave fields empty.
    pub fn gather(layout: &OutputLayout, stem: &str) -> Self {
        let text_path = layout.text_path(stem);
        Self {
            chunks_count: read_chunk_file(&layout.chunks_path(stem))
                .ok()
                .map(|c| c.len()),
            text_size_bytes: file_size(&text_path),
            text_lines: count_lines(&text_path),
            json_size_bytes: file_size(&layout.record_path(stem)),
            markdown_size_bytes: file_size(&layout.markdown_path(stem)),
            jsonl_size_bytes: file_size(&layout.jsonl_path(stem)),
        }
    }
}

fn file_size(path: &std::path::Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

fn count_lines(path: &std::path::Path) -> Option<usize> {
    let file = std::fs::File::open(path).ok()?;
    Some(BufReader::new(file).lines().count())
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub size_bytes: u64,
    pub modified: String,
    pub status: FileStatus,
    pub pages: Option<usize>,
    pub info: ProcessedInfo,
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(source: &SourceFile, status: FileStatus) -> Self {
        Self {
            name: source.name.clone(),
            size_bytes: source.size_bytes,
            modified: source.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
            status,
            pages: None,
            info: ProcessedInfo::default(),
            error: None,
        }
    }
}

/// Totals and per-file details for one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub found: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Status listing only.
    pub built: usize,
    /// Status listing only.
    pub pending: usize,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Processed => self.processed += 1,
            FileStatus::Skipped => self.skipped += 1,
            FileStatus::Error => self.failed += 1,
            FileStatus::Built => self.built += 1,
            FileStatus::Pending => self.pending += 1,
        }
        self.files.push(report);
    }

    /// Whether any input ended up with usable outputs.
    pub fn has_output(&self) -> bool {
        self.processed > 0 || self.skipped > 0
    }
}

/// Sizes are shown in MB with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

pub fn render_summary(summary: &RunSummary) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\nDetailed Processing Summary:");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Total PDFs found: {}", summary.found);
    let _ = writeln!(out, "Newly processed: {}", summary.processed);
    let _ = writeln!(out, "Skipped (already processed): {}", summary.skipped);
    if summary.failed > 0 {
        let _ = writeln!(out, "Failed: {}", summary.failed);
    }
    render_details(&mut out, summary);
    out
}

/// Summary for `docrag status`: what is built and what is still pending.
pub fn render_status(summary: &RunSummary) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\nOutput Status:");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Total PDFs found: {}", summary.found);
    let _ = writeln!(out, "Already built: {}", summary.built);
    let _ = writeln!(out, "Pending: {}", summary.pending);
    render_details(&mut out, summary);
    out
}

fn render_details(out: &mut String, summary: &RunSummary) {
    let _ = writeln!(out, "\nFile Details:");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for file in &summary.files {
        render_file(out, file);
    }
}

fn render_file(out: &mut String, file: &FileReport) {
    let info = &file.info;
    let _ = writeln!(out, "\nFile: {}", file.name);
    let _ = writeln!(out, "Status: {}", file.status);
    let _ = writeln!(out, "Size: {}", format_mb(file.size_bytes));
    let _ = writeln!(out, "Last modified: {}", file.modified);

    if let Some(pages) = file.pages {
        let _ = writeln!(out, "Pages: {}", pages);
    }
    if let Some(n) = info.chunks_count {
        let _ = writeln!(out, "Chunks generated: {}", n);
    }
    if let Some(size) = info.text_size_bytes {
        let _ = writeln!(out, "Extracted text size: {}", format_mb(size));
    }
    if let Some(size) = info.json_size_bytes {
        let _ = writeln!(out, "JSON file size: {}", format_mb(size));
    }
    if let Some(size) = info.markdown_size_bytes {
        let _ = writeln!(out, "Markdown file size: {}", format_mb(size));
    }
    if let Some(lines) = info.text_lines {
        let _ = writeln!(out, "Text lines: {}", lines);
    }
    if let Some(size) = info.jsonl_size_bytes {
        let _ = writeln!(out, "JSONL file size: {}", format_mb(size));
    }
    if let Some(err) = &file.error {
        let _ = writeln!(out, "Error: {}", err);
    }
}
