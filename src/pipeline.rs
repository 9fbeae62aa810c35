//! Processing orchestration.
//!
//! Coordinates a full run: pre-flight checks → scan input folder → for each
//! source document, skip if already built, otherwise extract → markdown →
//! chunk → write outputs → finally assemble the knowledge collection.
//!
//! Failures are isolated per document: an extraction or write error is
//! recorded in that file's report and the run moves on to the next file.

use anyhow::{bail, Context, Result};
use chrono::Local;

use crate::cache;
use crate::chunk::chunk_text;
use crate::collection::{self, CollectionOutput};
use crate::config::Config;
use crate::error::DocragError;
use crate::export::{self, DocumentOutputs, OutputLayout};
use crate::extract::{PdfExtractor, TextExtractor};
use crate::markdown::Reconstructor;
use crate::models::DocumentRecord;
use crate::progress::{ProgressEvent, ProgressReporter};
use crate::report::{self, FileReport, FileStatus, ProcessedInfo, RunSummary};
use crate::scan::{self, SourceFile};

/// Flags for one `process` run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Reprocess every file, ignoring the build cache.
    pub force: bool,
    /// Do not assemble the collection afterwards.
    pub skip_collection: bool,
}

/// Fail fast when the run cannot possibly succeed.
///
/// The input folder must exist and every output directory must be
/// creatable. Runs once before any document is touched.
pub fn preflight(config: &Config) -> Result<()> {
    let input = &config.paths.input_dir;
    if !input.is_dir() {
        bail!(
            "Input directory not found: {} (set paths.input_dir in the config)",
            input.display()
        );
    }
    std::fs::read_dir(input)
        .with_context(|| format!("Input directory is not readable: {}", input.display()))?;

    config
        .layout()
        .create_dirs()
        .context("Cannot create output directories")?;

    tracing::debug!(input = %input.display(), output = %config.paths.output_dir.display(), "preflight ok");
    Ok(())
}

/// Process every input with the PDF extractor and print the summary.
pub fn run_process(
    config: &Config,
    options: ProcessOptions,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    run_process_with(config, options, &PdfExtractor, progress)
}

/// Process every input with the given extractor and print the summary.
pub fn run_process_with(
    config: &Config,
    options: ProcessOptions,
    extractor: &dyn TextExtractor,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    preflight(config)?;

    progress.report(ProgressEvent::Discovering {
        input: config.paths.input_dir.display().to_string(),
    });
    let files = scan::scan_inputs(config)?;
    println!("Found {} PDF files", files.len());

    let layout = config.layout();
    let build_cache = cache::for_mode(config.cache.mode, layout.clone());
    let reconstructor = Reconstructor::for_style(config.markdown.numbered_lists);

    let mut summary = RunSummary {
        found: files.len(),
        ..Default::default()
    };
    let total = files.len() as u64;

    for (i, file) in files.iter().enumerate() {
        progress.report(ProgressEvent::Processing {
            file: file.name.clone(),
            n: i as u64 + 1,
            total,
        });

        if !options.force && build_cache.is_built(file) {
            println!("Skipping {} - already processed", file.name);
            let mut file_report = FileReport::new(file, FileStatus::Skipped);
            file_report.info = ProcessedInfo::gather(&layout, &file.stem);
            summary.record(file_report);
            continue;
        }

        println!("Processing {}", file.name);
        let file_report = match process_file(config, &layout, extractor, &reconstructor, file) {
            Ok(pages) => {
                println!("Successfully processed {}", file.name);
                println!("Files saved in folder: {}", layout.doc_dir(&file.stem).display());
                let mut file_report = FileReport::new(file, FileStatus::Processed);
                file_report.pages = Some(pages);
                file_report.info = ProcessedInfo::gather(&layout, &file.stem);
                file_report
            }
            Err(e) => {
                tracing::error!(file = %file.name, error = %e, "processing failed");
                println!("Error with {}: {}", file.name, e);
                let mut file_report = FileReport::new(file, FileStatus::Error);
                file_report.error = Some(e.to_string());
                file_report
            }
        };
        summary.record(file_report);
    }

    print!("{}", report::render_summary(&summary));

    if !options.skip_collection && (summary.processed > 0 || options.force) {
        run_collection(config, progress)?;
    }

    Ok(summary)
}

/// Extract, reconstruct, chunk and write one document. Returns its page count.
fn process_file(
    config: &Config,
    layout: &OutputLayout,
    extractor: &dyn TextExtractor,
    reconstructor: &Reconstructor,
    file: &SourceFile,
) -> std::result::Result<usize, DocragError> {
    let bytes = std::fs::read(&file.path).map_err(|e| DocragError::io(&file.path, e))?;
    let extracted = extractor.extract(&file.path, &bytes)?;
    tracing::debug!(
        file = %file.name,
        pages = extracted.page_count,
        chars = extracted.text.chars().count(),
        "extracted text"
    );

    let processed_date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let markdown = reconstructor.reconstruct(
        &extracted.text,
        &file.stem,
        extracted.page_count,
        &file.name,
        &processed_date,
    );

    let chunking = &config.chunking;
    let chunks = chunk_text(
        &extracted.text,
        &file.name,
        chunking.chunk_size,
        chunking.overlap,
        chunking.total_chunks,
    )?;

    let record = DocumentRecord {
        title: file.stem.clone(),
        source: file.name.clone(),
        pages: extracted.page_count,
        processed_date,
        chunks_count: chunks.len(),
        full_text: extracted.text.clone(),
        source_sha256: Some(cache::sha256_hex(&bytes)),
    };

    export::write_document(
        layout,
        &DocumentOutputs {
            stem: &file.stem,
            text: &extracted.text,
            markdown: &markdown,
            record: &record,
            chunks: &chunks,
        },
    )?;
    tracing::info!(file = %file.name, chunks = chunks.len(), "wrote outputs");

    Ok(extracted.page_count)
}

/// Rebuild the knowledge collection from every chunk file on disk.
///
/// Returns `None` when there are no chunks to assemble.
pub fn run_collection(
    config: &Config,
    progress: &dyn ProgressReporter,
) -> Result<Option<CollectionOutput>> {
    println!("\nPreparing knowledge collection...");
    let layout = config.layout();

    let sets = collection::load_chunk_sets(&layout.chunks_dir())?;
    progress.report(ProgressEvent::Assembling {
        chunk_files: sets.len() as u64,
    });
    for (name, chunks) in &sets {
        println!("Loaded {} chunks from {}", chunks.len(), name);
    }

    let collection = collection::assemble(sets, &config.collection.name)
        .context("Cannot assemble collection")?;
    if collection.is_empty() {
        println!("No chunks found for the collection");
        return Ok(None);
    }
    println!("Loaded {} total chunks", collection.chunk_count());

    let output = collection::write_collection(&layout.collection_dir(), &collection)?;
    println!(
        "Created collection with {} documents",
        collection.documents.len()
    );
    println!("Saved to {}", output.json_path.display());
    println!(
        "Import instructions saved to {}",
        output.instructions_path.display()
    );

    Ok(Some(output))
}

/// Report the current output tree for every input without processing.
pub fn run_status(config: &Config) -> Result<RunSummary> {
    let files = scan::scan_inputs(config)?;
    let layout = config.layout();
    let build_cache = cache::for_mode(config.cache.mode, layout.clone());

    let mut summary = RunSummary {
        found: files.len(),
        ..Default::default()
    };
    for file in &files {
        let status = if build_cache.is_built(file) {
            FileStatus::Built
        } else {
            FileStatus::Pending
        };
        let mut file_report = FileReport::new(file, status);
        file_report.info = ProcessedInfo::gather(&layout, &file.stem);
        file_report.pages = std::fs::read_to_string(layout.record_path(&file.stem))
            .ok()
            .and_then(|s| serde_json::from_str::<DocumentRecord>(&s).ok())
            .map(|r| r.pages);
        summary.record(file_report);
    }

    print!("{}", report::render_status(&summary));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedText;
    use crate::models::Collection;
    use crate::progress::NoProgress;
    use std::fs;
    use std::path::Path;

    /// Treats file bytes as UTF-8 text; files starting with "BAD" fail.
    struct PlainTextExtractor;

    impl TextExtractor for PlainTextExtractor {
        fn extract(&self, path: &Path, bytes: &[u8]) -> crate::error::Result<ExtractedText> {
            let text = String::from_utf8_lossy(bytes).to_string();
            if text.starts_with("BAD") {
                return Err(DocragError::Extract {
                    path: path.to_path_buf(),
                    message: "corrupt".to_string(),
                });
            }
            Ok(ExtractedText {
                text,
                page_count: 2,
            })
        }
    }

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, Config) {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("pdfs");
        fs::create_dir_all(&input).unwrap();
        for (name, body) in files {
            fs::write(input.join(name), body).unwrap();
        }
        let mut config = Config::minimal();
        config.paths.input_dir = input;
        config.paths.output_dir = tmp.path().join("out");
        config.chunking.chunk_size = 20;
        config.chunking.overlap = 5;
        (tmp, config)
    }

    fn run(config: &Config, options: ProcessOptions) -> RunSummary {
        run_process_with(config, options, &PlainTextExtractor, &NoProgress).unwrap()
    }

    #[test]
    fn test_preflight_requires_input_dir() {
        let (tmp, mut config) = setup(&[]);
        config.paths.input_dir = tmp.path().join("missing");
        let err = preflight(&config).unwrap_err();
        assert!(err.to_string().contains("Input directory not found"));
    }

    #[test]
    fn test_process_writes_outputs_and_collection() {
        let (_tmp, config) = setup(&[
            ("alpha.pdf", "INTRODUCTION\n\nAlpha body text that is long enough to chunk."),
            ("beta.pdf", "Beta body."),
        ]);
        let summary = run(&config, ProcessOptions::default());
        assert_eq!(summary.found, 2);
        assert_eq!(summary.processed, 2);

        let layout = config.layout();
        let md = fs::read_to_string(layout.markdown_path("alpha")).unwrap();
        assert!(md.starts_with("# alpha\n\n**Source**: alpha.pdf\n**Pages**: 2\n"));
        assert!(md.contains("## INTRODUCTION\n\n"));

        let chunks = collection::read_chunk_file(&layout.chunks_path("alpha")).unwrap();
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.metadata.source == "alpha.pdf"));

        let jsonl = fs::read_to_string(layout.jsonl_path("alpha")).unwrap();
        assert_eq!(jsonl.lines().count(), chunks.len());

        let record: DocumentRecord =
            serde_json::from_str(&fs::read_to_string(layout.record_path("beta")).unwrap()).unwrap();
        assert_eq!(record.source, "beta.pdf");
        assert_eq!(record.pages, 2);
        assert!(record.source_sha256.is_some());

        let collection_path = layout.collection_dir().join(collection::COLLECTION_FILE);
        let collection: Collection =
            serde_json::from_str(&fs::read_to_string(collection_path).unwrap()).unwrap();
        assert_eq!(collection.documents.len(), 2);
        assert_eq!(collection.documents[0].title, "alpha.pdf");
    }

    #[test]
    fn test_second_run_skips_and_force_reprocesses() {
        let (_tmp, config) = setup(&[("alpha.pdf", "Alpha body.")]);
        run(&config, ProcessOptions::default());

        let again = run(&config, ProcessOptions::default());
        assert_eq!((again.processed, again.skipped), (0, 1));
        assert_eq!(again.files[0].info.chunks_count, Some(1));

        let forced = run(
            &config,
            ProcessOptions {
                force: true,
                skip_collection: true,
            },
        );
        assert_eq!((forced.processed, forced.skipped), (1, 0));
    }

    #[test]
    fn test_failure_is_isolated() {
        let (_tmp, config) = setup(&[("a.pdf", "BAD bytes"), ("b.pdf", "Good text.")]);
        let summary = run(&config, ProcessOptions::default());
        assert_eq!((summary.processed, summary.failed), (1, 1));
        assert_eq!(summary.files[0].status, FileStatus::Error);
        assert!(summary.files[0].error.as_deref().unwrap().contains("corrupt"));
        assert!(config.layout().chunks_path("b").exists());
    }

    #[test]
    fn test_extractor_panic_is_isolated() {
        use crate::extract::fixtures;

        let (tmp, config) = setup(&[]);
        let input = tmp.path().join("pdfs");
        fs::write(input.join("a.pdf"), fixtures::pdf_with_undefined_font()).unwrap();
        fs::write(input.join("b.pdf"), fixtures::pdf_with_phrase("still processed")).unwrap();

        let summary = run_process_with(
            &config,
            ProcessOptions::default(),
            &PdfExtractor,
            &NoProgress,
        )
        .unwrap();

        assert_eq!((summary.processed, summary.failed), (1, 1));
        assert_eq!(summary.files[0].name, "a.pdf");
        assert_eq!(summary.files[0].status, FileStatus::Error);
        assert_eq!(summary.files[1].status, FileStatus::Processed);
        assert!(config.layout().chunks_path("b").exists());
        assert!(config
            .layout()
            .collection_dir()
            .join(collection::COLLECTION_FILE)
            .exists());
    }

    #[test]
    fn test_partial_write_is_retried_next_run() {
        let (_tmp, config) = setup(&[("a.pdf", "Some text to chunk.")]);
        let layout = config.layout();
        let blocker = layout.jsonl_path("a");
        fs::create_dir_all(&blocker).unwrap();

        let first = run(&config, ProcessOptions::default());
        assert_eq!((first.processed, first.failed), (0, 1));
        assert!(!layout.chunks_path("a").exists());

        fs::remove_dir_all(&blocker).unwrap();
        let second = run(&config, ProcessOptions::default());
        assert_eq!((second.processed, second.skipped), (1, 0));
        assert!(layout.jsonl_path("a").is_file());
        assert!(layout.chunks_path("a").exists());
    }

    #[test]
    fn test_skip_collection() {
        let (_tmp, config) = setup(&[("a.pdf", "Text.")]);
        run(
            &config,
            ProcessOptions {
                force: false,
                skip_collection: true,
            },
        );
        assert!(!config.layout().collection_dir().exists());
    }

    #[test]
    fn test_collection_with_no_chunks() {
        let (_tmp, config) = setup(&[]);
        preflight(&config).unwrap();
        assert!(run_collection(&config, &NoProgress).unwrap().is_none());
    }

    #[test]
    fn test_status_reports_pending_and_built() {
        let (_tmp, config) = setup(&[("a.pdf", "Text.")]);
        let before = run_status(&config).unwrap();
        assert_eq!(before.files[0].status, FileStatus::Pending);

        run(&config, ProcessOptions::default());
        let after = run_status(&config).unwrap();
        assert_eq!(after.files[0].status, FileStatus::Built);
        assert_eq!(after.files[0].pages, Some(2));
        assert_eq!((after.built, after.pending, after.skipped), (1, 0, 0));
    }
}
