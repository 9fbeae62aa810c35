//! # docrag
//!
//! Turns a folder of PDF documents into RAG-ready artifacts: plain text,
//! heuristic markdown, a JSON record, fixed-size overlapping chunk files,
//! and a consolidated knowledge collection for bulk import.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────────┐
//! │  pdfs/   │──▶│  Extract  │──▶│ Chunk + MD   │──▶│ processed_   │
//! │  *.pdf   │   │ text+pages│   │ reconstruct  │   │ docs/...     │
//! └──────────┘   └───────────┘   └──────────────┘   └──────┬───────┘
//!                                                          ▼
//!                                                 ┌─────────────────┐
//!                                                 │   Collection    │
//!                                                 │   assembler     │
//!                                                 └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chunk`] | Fixed-size overlapping chunker |
//! | [`markdown`] | Heading/list inference and markdown rendering |
//! | [`collection`] | Knowledge collection assembly and persistence |
//! | [`extract`] | PDF text extraction |
//! | [`pipeline`] | Run orchestration |
//! | [`config`] | TOML configuration |
//! | [`models`] | Core data types |

pub mod cache;
pub mod chunk;
pub mod collection;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod markdown;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod scan;
