//! Census data ingestion.
//!
//! This crate turns external resources into rows for the explorer:
//!
//! - **Row parsing**: CSV text to [`Row`](census_model::Row)s with per-cell
//!   type inference and progress reports
//! - **Fetching**: the [`Fetcher`] collaborator with filesystem, in-memory
//!   and (feature `http`) HTTP implementations
//! - **Manifest**: the catalog of available datasets
//!
//! # Example
//!
//! ```ignore
//! use census_ingest::{FsFetcher, Fetcher, load_manifest, parse_rows};
//!
//! let fetcher = FsFetcher::new("public");
//! let manifest = load_manifest(&fetcher).await?;
//! let text = fetcher.fetch_text("data/census2024_state.csv").await?;
//! let rows = parse_rows(&text)?;
//! ```

mod error;
mod fetch;
mod manifest;
mod parser;
mod progress;

// === Error Types ===
pub use error::{IngestError, IngestErrorKind, Result};

// === Fetching ===
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetcher, FsFetcher, MemoryFetcher, ensure_payload, resolve_path};

// === Manifest ===
pub use manifest::{load_manifest, parse_manifest};

// === Row Parsing ===
pub use parser::{infer_cell, parse_rows, parse_rows_with_progress};
pub use progress::{MAX_PENDING_PERCENTAGE, PROGRESS_INTERVAL, ParseProgress, ParseStage};
