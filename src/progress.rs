//! Processing progress reporting.
//!
//! Reports observable progress during `docrag process` so users see which
//! file is being worked on and how many are left. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Scanning the input folder (total unknown).
    Discovering { input: String },
    /// Working on file `n` of `total`.
    Processing { file: String, n: u64, total: u64 },
    /// Assembling the collection from chunk files.
    Assembling { chunk_files: u64 },
}

/// Reports progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "process  12 / 1,040  report.pdf".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Discovering { input } => {
                format!("scan {}  discovering...\n", input)
            }
            ProgressEvent::Processing { file, n, total } => format!(
                "process  {} / {}  {}\n",
                format_number(*n),
                format_number(*total),
                file
            ),
            ProgressEvent::Assembling { chunk_files } => format!(
                "collection  assembling from {} chunk files\n",
                format_number(*chunk_files)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Discovering { input } => serde_json::json!({
                "event": "progress",
                "phase": "discovering",
                "input": input
            }),
            ProgressEvent::Processing { file, n, total } => serde_json::json!({
                "event": "progress",
                "phase": "processing",
                "file": file,
                "n": n,
                "total": total
            }),
            ProgressEvent::Assembling { chunk_files } => serde_json::json!({
                "event": "progress",
                "phase": "assembling",
                "chunk_files": chunk_files
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
