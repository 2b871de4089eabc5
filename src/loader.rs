use crate::archive::{extract_tables, FileRole, RawTables};
use crate::config::IngestConfig;
use crate::error::{PblError, Result};
use crate::model::{build_dataset, BuildReport, ParsedTables};
use crate::types::{Header, ParsedDataset, Record};
use crate::util::{coerce_cell, detect_delimiter};
use chrono::Utc;
use csv::ReaderBuilder;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub totals_rows: usize,
    pub strategy_rows: usize,
    pub detail_rows: usize,
    pub unreadable_rows: usize,
    pub build: BuildReport,
}

/// Parse one delimited table with a header row.
///
/// Headers are trimmed, blank lines are skipped and every cell goes
/// through [`coerce_cell`]. Cells past the header width are dropped; a row
/// shorter than the header simply lacks its trailing keys. Returns the
/// records and the number of rows the CSV reader rejected. `archive` only
/// labels errors and log lines.
pub fn parse_table(text: &str, role: FileRole, archive: &str) -> Result<(Vec<Record>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = rdr
        .headers()
        .map_err(|source| PblError::Csv {
            archive: archive.to_string(),
            role,
            source,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();
    let width = header.len();
    let header = Arc::new(Header::new(header));

    let mut records = Vec::new();
    let mut unreadable = 0usize;
    for result in rdr.records() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{} {}: unreadable row: {}", archive, role, e);
                unreadable += 1;
                continue;
            }
        };
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let values = row.iter().take(width).map(coerce_cell).collect();
        records.push(Record::new(header.clone(), values));
    }
    log::debug!("{} {}: {} rows, {} columns", archive, role, records.len(), width);
    Ok((records, unreadable))
}

/// Parse the three decoded member files and build the dataset.
pub fn load_tables(tables: &RawTables, source: &str, config: &IngestConfig) -> Result<(ParsedDataset, LoadReport)> {
    let mut report = LoadReport::default();
    let mut parsed = ParsedTables::default();
    for role in FileRole::ALL {
        let (records, unreadable) = parse_table(tables.get(role), role, source)?;
        report.unreadable_rows += unreadable;
        match role {
            FileRole::Totals => {
                report.totals_rows = records.len();
                parsed.totals = records;
            }
            FileRole::Strategy => {
                report.strategy_rows = records.len();
                parsed.strategy = records;
            }
            FileRole::Detail => {
                report.detail_rows = records.len();
                parsed.detail = records;
            }
        }
    }

    let (dataset, build) = build_dataset(parsed, source, config, Utc::now())?;
    report.build = build;
    log::info!(
        "{}: loaded {} neighborhoods, {} scenario columns",
        source,
        dataset.metadata.neighborhood_count,
        dataset.metadata.scenario_column_count
    );
    Ok((dataset, report))
}

/// Full ingestion of a PBL archive held in memory.
///
/// The bytes may come from a direct download, a proxy or a local file;
/// `source` only labels the upload in errors and metadata.
pub fn load_archive(bytes: &[u8], source: &str, config: &IngestConfig) -> Result<(ParsedDataset, LoadReport)> {
    let tables = extract_tables(bytes, source)?;
    load_tables(&tables, source, config)
}

pub fn load_archive_file<P: AsRef<Path>>(path: P, config: &IngestConfig) -> Result<(ParsedDataset, LoadReport)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_archive(&bytes, &source, config)
}
