//! Builds the per-neighborhood model out of the three parsed PBL tables.
//!
//! Strategy rows are folded in two stages: rows are first grouped by
//! neighborhood code, then each group's indicator rows are pivoted into a
//! [`StrategyMatrix`].
use crate::config::IngestConfig;
use crate::error::{PblError, Result};
use crate::types::{
    CellValue, DatasetMetadata, NeighborhoodRecord, ParsedDataset, Record, StrategyMatrix, TotalsRecord,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The three tables as produced by the loader.
#[derive(Debug, Clone, Default)]
pub struct ParsedTables {
    pub totals: Vec<Record>,
    pub strategy: Vec<Record>,
    pub detail: Vec<Record>,
}

impl ParsedTables {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty() && self.strategy.is_empty() && self.detail.is_empty()
    }
}

/// Counts of rows the builder absorbed instead of failing on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub rows_without_code: usize,
    pub duplicate_totals: usize,
    pub duplicate_indicators: usize,
    pub extra_basis_rows: usize,
    pub orphan_detail_rows: usize,
}

/// One neighborhood's strategy rows split into basis and indicator rows.
#[derive(Debug, Clone, Default)]
pub struct StrategyGroup {
    pub basis: Option<Record>,
    pub matrix_rows: Vec<Record>,
    pub extra_basis_rows: usize,
}

pub fn neighborhood_code(row: &Record, config: &IngestConfig) -> Option<String> {
    config
        .code_fields
        .iter()
        .find_map(|field| row.get(field).and_then(CellValue::as_key))
}

/// Group strategy rows by neighborhood, in first-seen order.
///
/// Returns the groups and the number of rows that carried no code.
pub fn group_by_neighborhood(rows: Vec<Record>, config: &IngestConfig) -> (Vec<(String, StrategyGroup)>, usize) {
    let mut groups: Vec<(String, StrategyGroup)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut without_code = 0usize;

    for row in rows {
        let Some(code) = neighborhood_code(&row, config) else {
            without_code += 1;
            continue;
        };
        let slot = *index.entry(code.clone()).or_insert_with(|| {
            groups.push((code, StrategyGroup::default()));
            groups.len() - 1
        });
        let group = &mut groups[slot].1;
        if row.value(&config.indicator_field).is_blank() {
            if group.basis.is_none() {
                group.basis = Some(row);
            } else {
                group.extra_basis_rows += 1;
            }
        } else {
            group.matrix_rows.push(row);
        }
    }
    (groups, without_code)
}

/// Scenario columns of a group: every field of its first indicator row
/// that is not one of the structural strategy fields.
///
/// A repeated header name is kept once, at its first position.
pub fn scenario_columns(first_matrix_row: &Record, config: &IngestConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in first_matrix_row.field_names() {
        if config.is_structural(name) {
            continue;
        }
        if !seen.insert(name) {
            log::warn!("repeated scenario column {}, keeping the first one", name);
            continue;
        }
        columns.push(name.to_string());
    }
    columns
}

/// Pivot indicator rows into `indicator -> column -> value`.
///
/// Every row gets a cell for every column; a column the row does not reach
/// is stored as `Null`. Returns the matrix and the number of indicator
/// codes that appeared more than once (the last row wins).
pub fn pivot(rows: &[Record], columns: &[String], config: &IngestConfig) -> (StrategyMatrix, usize) {
    let mut matrix = StrategyMatrix::default();
    let mut duplicates = 0usize;
    for row in rows {
        let Some(indicator) = row.value(&config.indicator_field).as_key() else {
            continue;
        };
        let cells: BTreeMap<String, CellValue> = columns
            .iter()
            .map(|column| (column.clone(), row.value(column).clone()))
            .collect();
        if matrix.row(&indicator).is_some() {
            duplicates += 1;
        }
        matrix.insert_row(indicator, cells);
    }
    (matrix, duplicates)
}

/// Assemble a [`ParsedDataset`] from the three tables.
///
/// Fails only when all three tables are empty.
pub fn build_dataset(
    tables: ParsedTables,
    source: &str,
    config: &IngestConfig,
    parsed_at: DateTime<Utc>,
) -> Result<(ParsedDataset, BuildReport)> {
    if tables.is_empty() {
        return Err(PblError::NoUsableData {
            archive: source.to_string(),
        });
    }
    let ParsedTables {
        totals,
        strategy,
        detail,
    } = tables;

    let mut report = BuildReport::default();
    let mut neighborhoods: BTreeMap<String, NeighborhoodRecord> = BTreeMap::new();
    // First-seen order, used to pick the dataset-wide scenario columns.
    let mut order: Vec<String> = Vec::new();

    for row in totals {
        let Some(code) = neighborhood_code(&row, config) else {
            report.rows_without_code += 1;
            continue;
        };
        let entry = neighborhoods.entry(code.clone()).or_insert_with(|| {
            order.push(code.clone());
            NeighborhoodRecord::default()
        });
        if entry.totals.is_some() {
            report.duplicate_totals += 1;
            log::warn!("{}: duplicate totals row for {}, keeping the last one", source, code);
        }
        entry.totals = Some(TotalsRecord(row));
    }

    let (groups, without_code) = group_by_neighborhood(strategy, config);
    report.rows_without_code += without_code;
    log::debug!("{}: {} neighborhoods in strategy table", source, groups.len());

    for (code, group) in groups {
        let entry = neighborhoods.entry(code.clone()).or_insert_with(|| {
            order.push(code.clone());
            NeighborhoodRecord::default()
        });
        report.extra_basis_rows += group.extra_basis_rows;
        entry.basis = group.basis;
        if let Some(first) = group.matrix_rows.first() {
            let columns = scenario_columns(first, config);
            let (matrix, duplicates) = pivot(&group.matrix_rows, &columns, config);
            if duplicates > 0 {
                log::warn!("{}: {} repeated indicator rows for {}", source, duplicates, code);
            }
            report.duplicate_indicators += duplicates;
            entry.matrix = matrix;
            entry.scenario_columns = columns;
        }
    }

    for row in detail {
        let target = neighborhood_code(&row, config)
            .and_then(|code| neighborhoods.get_mut(&code))
            .filter(|n| n.totals.is_some());
        match target {
            Some(record) => record.detail.push(row),
            None => report.orphan_detail_rows += 1,
        }
    }

    let scenario_columns = order
        .iter()
        .filter_map(|code| neighborhoods.get(code))
        .find(|n| n.has_matrix() && !n.scenario_columns.is_empty())
        .map(|n| n.scenario_columns.clone())
        .unwrap_or_default();

    if report.rows_without_code > 0 {
        log::warn!("{}: skipped {} rows without a neighborhood code", source, report.rows_without_code);
    }
    if report.orphan_detail_rows > 0 {
        log::debug!("{}: dropped {} detail rows for unknown neighborhoods", source, report.orphan_detail_rows);
    }

    let metadata = DatasetMetadata {
        source: source.to_string(),
        neighborhood_count: neighborhoods.len(),
        scenario_column_count: scenario_columns.len(),
        parsed_at,
    };
    Ok((
        ParsedDataset {
            neighborhoods,
            scenario_columns,
            metadata,
        },
        report,
    ))
}
