use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;

/// A single coerced CSV cell.
///
/// PBL tables are untyped and change between releases, so every cell is one
/// of three shapes instead of a per-column type.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

static NULL_CELL: CellValue = CellValue::Null;

impl CellValue {
    /// Numeric value, or `None` for text, null and NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// `true` for null and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Text form used when a cell keys a map (neighborhood or indicator code).
    ///
    /// Codes that were coerced to numbers are rendered back without a
    /// fractional part when they are whole.
    pub fn as_key(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            CellValue::Number(n) if n.is_finite() => {
                if n.fract() == 0.0 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            CellValue::Number(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Trimmed header row of one table, shared by all of its records.
#[derive(Debug, PartialEq)]
pub struct Header {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // First occurrence wins for duplicated header names.
            index.entry(name.clone()).or_insert(i);
        }
        Header { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One parsed row: an open mapping from column name to coerced value.
///
/// Values are stored positionally against the shared header. A short row
/// simply has fewer values, so trailing columns read as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<CellValue>,
}

impl Record {
    pub fn new(header: Arc<Header>, values: Vec<CellValue>) -> Self {
        Record { header, values }
    }

    /// The cell under `name`, or `None` if the column is unknown or the row
    /// is too short to reach it.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        let idx = self.header.position(name)?;
        self.values.get(idx)
    }

    /// Like [`Record::get`] but a missing key reads as [`CellValue::Null`].
    pub fn value(&self, name: &str) -> &CellValue {
        self.get(name).unwrap_or(&NULL_CELL)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(CellValue::as_f64)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(CellValue::as_key)
    }

    /// Present fields in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.header
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields().map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.values.len().min(self.header.names().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Full "totaalbebouwing" row of one neighborhood.
///
/// The long tail of building-stock columns stays reachable through
/// [`TotalsRecord::raw`]; the handful of well-known fields get accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TotalsRecord(pub Record);

impl TotalsRecord {
    pub fn raw(&self) -> &Record {
        &self.0
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    pub fn neighborhood_name(&self) -> Option<String> {
        self.0.text("I02_buurtnaam")
    }

    pub fn district_code(&self) -> Option<String> {
        self.0.text("I03_wijkcode")
    }

    pub fn district_name(&self) -> Option<String> {
        self.0.text("I04_wijknaam")
    }

    pub fn municipality_code(&self) -> Option<String> {
        self.0.text("I05_gemeentecode")
    }

    pub fn municipality_name(&self) -> Option<String> {
        self.0.text("I06_gemeentenaam")
    }

    pub fn energy_region(&self) -> Option<String> {
        self.0.text("I07_energieregio")
    }

    pub fn province(&self) -> Option<String> {
        self.0.text("I08_provincie")
    }

    pub fn dwellings(&self) -> Option<f64> {
        self.0.number("I09_aantal_woningen")
    }

    pub fn non_residential_units(&self) -> Option<f64> {
        self.0.number("I10_aantal_utiliteit")
    }

    pub fn dwelling_equivalents(&self) -> Option<f64> {
        self.0.number("I11_woningequivalenten")
    }

    pub fn baseline_co2(&self) -> Option<f64> {
        self.0.number("I12_CO2_startjaar")
    }
}

/// Pivoted strategy table of one neighborhood: indicator code, then scenario
/// column, then value.
///
/// Every indicator row holds a cell for every scenario column of the
/// neighborhood; columns missing from a short source row hold `Null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct StrategyMatrix {
    rows: BTreeMap<String, BTreeMap<String, CellValue>>,
}

impl StrategyMatrix {
    pub(crate) fn insert_row(&mut self, indicator: String, cells: BTreeMap<String, CellValue>) {
        self.rows.insert(indicator, cells);
    }

    pub fn cell(&self, indicator: &str, column: &str) -> Option<&CellValue> {
        self.rows.get(indicator)?.get(column)
    }

    /// Numeric cell value; text, null, NaN and absent cells are all `None`.
    pub fn number(&self, indicator: &str, column: &str) -> Option<f64> {
        self.cell(indicator, column).and_then(CellValue::as_f64)
    }

    pub fn row(&self, indicator: &str) -> Option<&BTreeMap<String, CellValue>> {
        self.rows.get(indicator)
    }

    pub fn indicators(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NeighborhoodRecord {
    pub totals: Option<TotalsRecord>,
    /// Strategy row without an indicator code.
    pub basis: Option<Record>,
    pub matrix: StrategyMatrix,
    /// Scenario columns derived from this neighborhood's first matrix row.
    pub scenario_columns: Vec<String>,
    /// "bebouwing" rows in file order.
    pub detail: Vec<Record>,
}

impl NeighborhoodRecord {
    pub fn has_matrix(&self) -> bool {
        !self.matrix.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub source: String,
    pub neighborhood_count: usize,
    pub scenario_column_count: usize,
    pub parsed_at: DateTime<Utc>,
}

/// Immutable result of one ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDataset {
    pub neighborhoods: BTreeMap<String, NeighborhoodRecord>,
    pub scenario_columns: Vec<String>,
    pub metadata: DatasetMetadata,
}

impl ParsedDataset {
    pub fn get(&self, code: &str) -> Option<&NeighborhoodRecord> {
        self.neighborhoods.get(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.neighborhoods.keys().map(String::as_str)
    }
}

/// Per-indicator averages of a selection under one scenario column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAggregate {
    pub column: String,
    pub averages: BTreeMap<String, f64>,
    pub neighborhood_count: usize,
}

impl ScenarioAggregate {
    pub fn average(&self, indicator: &str) -> Option<f64> {
        self.averages.get(indicator).copied()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StrategyOverviewRow {
    #[serde(rename = "Strategy")]
    #[tabled(rename = "Strategy")]
    pub strategy: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Variant")]
    #[tabled(rename = "Variant")]
    pub variant_code: String,
    #[serde(rename = "Envelope")]
    #[tabled(rename = "Envelope")]
    pub envelope: String,
    #[serde(rename = "CostPerTonCO2")]
    #[tabled(rename = "CostPerTonCO2")]
    pub cost_per_ton_co2: String,
    #[serde(rename = "TotalExtraCost")]
    #[tabled(rename = "TotalExtraCost")]
    pub total_extra_cost: String,
    #[serde(rename = "CO2Emission")]
    #[tabled(rename = "CO2Emission")]
    pub co2_emission: String,
    #[serde(rename = "CO2Reduction")]
    #[tabled(rename = "CO2Reduction")]
    pub co2_reduction: String,
    #[serde(rename = "AvgDemand")]
    #[tabled(rename = "AvgDemand")]
    pub avg_demand: String,
    #[serde(rename = "Connections")]
    #[tabled(rename = "Connections")]
    pub connections: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ScenarioComparisonRow {
    #[serde(rename = "Column")]
    #[tabled(rename = "Column")]
    pub column: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Code")]
    #[tabled(rename = "Code")]
    pub code: String,
    #[serde(rename = "AvgDemand")]
    #[tabled(rename = "AvgDemand")]
    pub avg_demand: String,
    #[serde(rename = "CO2Emission")]
    #[tabled(rename = "CO2Emission")]
    pub co2_emission: String,
    #[serde(rename = "CO2ReductionPct")]
    #[tabled(rename = "CO2ReductionPct")]
    pub co2_reduction_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BuildingStockRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Column")]
    #[tabled(rename = "Column")]
    pub column: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub source: String,
    pub total_neighborhoods: usize,
    pub neighborhoods_with_matrix: usize,
    pub scenario_columns: usize,
    pub total_dwellings: f64,
    pub baseline_co2: Option<f64>,
    pub parsed_at: DateTime<Utc>,
}
