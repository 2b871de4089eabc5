//! Read-only aggregations over a [`ParsedDataset`].
//!
//! A neighborhood that lacks an indicator (or the scenario column, or holds a
//! non-numeric cell there) contributes to neither the sum nor the count.
use crate::types::{ParsedDataset, ScenarioAggregate, TotalsRecord};
use std::collections::BTreeMap;

/// Default for [`IngestConfig::co2_indicator`](crate::config::IngestConfig).
pub const CO2_INDICATOR: &str = "H15_CO2_uitstoot";
pub const COST_PER_TON_CO2_INDICATOR: &str = "H17_Nat_meerkost_CO2";

/// Prefixes tried after the plain name when summing building-stock columns.
const TOTALS_COLUMN_PREFIXES: [&str; 2] = ["Utiliteit_", "util_"];

fn values<'a, S: AsRef<str>>(
    dataset: &'a ParsedDataset,
    codes: &'a [S],
    indicator: &'a str,
    column: &'a str,
) -> impl Iterator<Item = f64> + 'a {
    codes
        .iter()
        .filter_map(move |code| dataset.get(code.as_ref())?.matrix.number(indicator, column))
}

/// Mean over the neighborhoods that report a number; `None` when none do.
pub fn average<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], indicator: &str, column: &str) -> Option<f64> {
    let (sum, count) = values(dataset, codes, indicator, column).fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Sum over the neighborhoods that report a number; `0.0` when none do.
pub fn sum<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], indicator: &str, column: &str) -> f64 {
    values(dataset, codes, indicator, column).sum()
}

/// Number of neighborhoods that reported a number.
pub fn contributing<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], indicator: &str, column: &str) -> usize {
    values(dataset, codes, indicator, column).count()
}

/// Average of every indicator present in the selection under one column.
///
/// Each indicator has its own denominator.
pub fn indicator_averages<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], column: &str) -> ScenarioAggregate {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut neighborhood_count = 0usize;
    for code in codes {
        let Some(record) = dataset.get(code.as_ref()) else {
            continue;
        };
        if !record.has_matrix() {
            continue;
        }
        neighborhood_count += 1;
        for indicator in record.matrix.indicators() {
            if let Some(v) = record.matrix.number(indicator, column) {
                let e = sums.entry(indicator.to_string()).or_insert((0.0, 0));
                e.0 += v;
                e.1 += 1;
            }
        }
    }
    let averages = sums
        .into_iter()
        .map(|(indicator, (total, count))| (indicator, total / count as f64))
        .collect();
    ScenarioAggregate {
        column: column.to_string(),
        averages,
        neighborhood_count,
    }
}

/// Percentage CO2 reduction of `scenario` against `baseline`.
///
/// A missing scenario value counts as zero; a missing or zero baseline is
/// replaced by one, so results against an all-zero baseline are not
/// meaningful. Reads [`CO2_INDICATOR`]; callers with a configured
/// indicator use [`co2_reduction_percent_for`].
pub fn co2_reduction_percent(scenario: &ScenarioAggregate, baseline: &ScenarioAggregate) -> f64 {
    co2_reduction_percent_for(scenario, baseline, CO2_INDICATOR)
}

pub fn co2_reduction_percent_for(scenario: &ScenarioAggregate, baseline: &ScenarioAggregate, indicator: &str) -> f64 {
    let scenario_co2 = scenario.average(indicator).unwrap_or(0.0);
    let baseline_co2 = baseline.average(indicator).filter(|v| *v != 0.0).unwrap_or(1.0);
    (baseline_co2 - scenario_co2) / baseline_co2 * 100.0
}

/// National extra cost per tonne CO2 avoided; `0.0` when absent.
pub fn cost_per_ton_co2(scenario: &ScenarioAggregate) -> f64 {
    scenario.average(COST_PER_TON_CO2_INDICATOR).unwrap_or(0.0)
}

/// Sum a totals column across a selection, trying the prefixed variants
/// when the plain name is absent. Missing values count as zero.
pub fn totals_column_sum<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], column: &str) -> f64 {
    codes
        .iter()
        .filter_map(|code| dataset.get(code.as_ref())?.totals.as_ref())
        .map(|totals| totals_column_value(totals, column).unwrap_or(0.0))
        .sum()
}

fn totals_column_value(totals: &TotalsRecord, column: &str) -> Option<f64> {
    let plain = totals.raw().number(column);
    if plain.is_some_and(|v| v != 0.0) {
        return plain;
    }
    TOTALS_COLUMN_PREFIXES
        .iter()
        .find_map(|prefix| totals.raw().number(&format!("{}{}", prefix, column)).filter(|v| *v != 0.0))
        .or(plain)
}

/// Sum a typed totals accessor (dwellings, CO2, ...) across a selection.
pub fn totals_sum<S, F>(dataset: &ParsedDataset, codes: &[S], field: F) -> f64
where
    S: AsRef<str>,
    F: Fn(&TotalsRecord) -> Option<f64>,
{
    codes
        .iter()
        .filter_map(|code| dataset.get(code.as_ref())?.totals.as_ref())
        .filter_map(field)
        .sum()
}

/// Codes of the selection that carry a strategy matrix.
pub fn with_matrix<'a, S: AsRef<str>>(dataset: &ParsedDataset, codes: &'a [S]) -> Vec<&'a str> {
    codes
        .iter()
        .map(|code| code.as_ref())
        .filter(|code| dataset.get(code).is_some_and(|n| n.has_matrix()))
        .collect()
}
