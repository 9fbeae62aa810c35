//! # docrag CLI
//!
//! ## Usage
//!
//! ```bash
//! docrag --config ./docrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docrag init` | Write a starter `docrag.toml` |
//! | `docrag process` | Extract, chunk and convert every new PDF, then build the collection |
//! | `docrag collection` | Rebuild the knowledge collection from existing chunk files |
//! | `docrag status` | Show what has been processed so far |

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use docrag::config::{self, Config, DEFAULT_CONFIG_TOML};
use docrag::pipeline::{self, ProcessOptions};
use docrag::progress::ProgressMode;

const DEFAULT_CONFIG_PATH: &str = "./docrag.toml";

/// docrag: turn a folder of PDFs into text, markdown, and RAG-ready chunks.
#[derive(Parser)]
#[command(
    name = "docrag",
    about = "Turn a folder of PDFs into text, markdown, and RAG-ready chunk files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./docrag.toml`; built-in defaults are used when that
    /// file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Progress reporting on stderr. Defaults to human output on a TTY.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config file.
    Init,

    /// Process every PDF in the input folder.
    ///
    /// Already-processed files are skipped unless `--force` is given. When
    /// anything was processed, the knowledge collection is rebuilt.
    Process {
        /// Reprocess all PDFs, ignoring existing outputs.
        #[arg(long)]
        force: bool,

        /// Do not build the knowledge collection.
        #[arg(long)]
        skip_collection: bool,
    },

    /// Rebuild the knowledge collection from existing chunk files.
    Collection,

    /// Show per-file status of the output tree.
    Status,
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "docrag=warn",
        1 => "docrag=debug",
        _ => "docrag=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                config::load_config(default)
            } else {
                tracing::debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
                Ok(Config::minimal())
            }
        }
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Commands::Init = cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        return write_default_config(&path);
    }

    let cfg = resolve_config(cli.config.as_deref())?;
    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Init => unreachable!(),
        Commands::Process {
            force,
            skip_collection,
        } => {
            let options = ProcessOptions {
                force,
                skip_collection,
            };
            let summary = pipeline::run_process(&cfg, options, progress.as_ref())?;
            if summary.has_output() {
                println!("\nProcessing completed successfully!");
            } else {
                println!("\nNo files were processed successfully!");
                std::process::exit(1);
            }
        }
        Commands::Collection => {
            pipeline::run_collection(&cfg, progress.as_ref())?;
        }
        Commands::Status => {
            pipeline::run_status(&cfg)?;
        }
    }

    Ok(())
}
