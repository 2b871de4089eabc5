//! Ingestion and aggregation of PBL "Startanalyse" municipality archives.
//!
//! ```text
//! ZIP bytes ──[archive]──▶ 3 × CSV text ──[loader]──▶ 3 × Vec<Record>
//!                                                        │
//!                                                        ▼ [model]
//!                                                  ParsedDataset
//!                                                        │
//!                              ┌─────────────────────────┼──────────────┐
//!                              ▼                         ▼              ▼
//!                         [aggregate]                [catalog]      [reports]
//! ```
//!
//! A dataset is built once per upload and never mutated; [`state::DatasetHandle`]
//! swaps whole datasets on re-upload.

pub mod aggregate;
pub mod archive;
pub mod area;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod reports;
pub mod state;
pub mod types;
pub mod util;

pub use archive::{extract_tables, FileRole, RawTables};
pub use config::IngestConfig;
pub use error::{PblError, Result};
pub use loader::{load_archive, load_archive_file, LoadReport};
pub use state::DatasetHandle;
pub use types::{CellValue, NeighborhoodRecord, ParsedDataset, Record, StrategyMatrix, TotalsRecord};
